use std::path::PathBuf;

use clap::Parser;

use crate::binding::{ColumnSpec, TableSpec, TextSearchSpec};
use crate::domain::{FilterError, TableConfig};

/// Browse a csv, parquet or arrow file and filter its rows by column values
/// and text search.
#[derive(Debug, Parser)]
#[command(name = "ft", version, about)]
pub struct Cli {
    /// Data file to open (csv, parquet, arrow)
    pub file: String,

    /// Comma separated columns with a category filter [default: all columns]
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Comma separated columns searched by one search box, can be repeated
    /// [default: one box over all columns]
    #[arg(short, long)]
    pub search: Vec<String>,

    /// Event poll time in ms
    #[arg(long, default_value_t = 100)]
    pub poll_ms: u64,

    /// Maximum rendered width of a column
    #[arg(long, default_value_t = 40)]
    pub max_column_width: usize,

    /// Log file [default: ./filtertable.log]
    #[arg(long)]
    pub log_file: Option<String>,

    /// Log level, overrides RUST_LOG
    #[arg(long)]
    pub log_level: Option<tracing::Level>,
}

impl Cli {
    pub fn data_path(&self) -> Result<PathBuf, FilterError> {
        expand_path(&self.file)
    }

    pub fn log_path(&self) -> Result<Option<PathBuf>, FilterError> {
        self.log_file.as_deref().map(expand_path).transpose()
    }

    pub fn config(&self) -> TableConfig {
        TableConfig::default()
            .with_event_poll_time(self.poll_ms)
            .with_max_column_width(self.max_column_width)
    }

    /// Column specs for `headers`, marking the `--filter` columns as filterable.
    pub fn table_spec(&self, table_id: &str, headers: &[String]) -> Result<TableSpec, FilterError> {
        let columns = match &self.filter {
            None => headers.iter().map(|h| ColumnSpec::new(h, true)).collect(),
            Some(list) => {
                let selected: Vec<&str> = split_ids(list).collect();
                if let Some(unknown) = selected
                    .iter()
                    .find(|id| !headers.iter().any(|h| h.trim() == **id))
                {
                    return Err(FilterError::UnknownColumn {
                        table: table_id.to_string(),
                        column: unknown.to_string(),
                    });
                }
                headers
                    .iter()
                    .map(|h| ColumnSpec::new(h, selected.contains(&h.trim())))
                    .collect()
            }
        };
        Ok(TableSpec {
            id: table_id.to_string(),
            columns,
        })
    }

    pub fn text_searches(&self, table_id: &str, headers: &[String]) -> Vec<TextSearchSpec> {
        if self.search.is_empty() {
            // Headers with a comma cannot be named in a column list
            let all = headers
                .iter()
                .filter(|h| !h.contains(','))
                .cloned()
                .collect::<Vec<_>>()
                .join(",");
            vec![TextSearchSpec::new(table_id, all)]
        } else {
            self.search
                .iter()
                .map(|ids| TextSearchSpec::new(table_id, ids.clone()))
                .collect()
        }
    }
}

fn split_ids(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|id| !id.is_empty())
}

fn expand_path(path: &str) -> Result<PathBuf, FilterError> {
    shellexpand::full(path)
        .map(|p| PathBuf::from(p.as_ref()))
        .map_err(|e| FilterError::LoadingFailed(e.to_string()))
}
