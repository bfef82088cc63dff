use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Instant;

use polars::prelude::*;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::domain::FilterError;

/// Displayed in place of missing values.
pub const NULL_CELL: &str = "∅";

#[derive(Debug, PartialEq)]
enum FileType {
    Csv,
    Parquet,
    Arrow,
}

/// A data file converted to display text, row by row.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl LoadedTable {
    /// Widest cell (or header) of every column, in chars.
    pub fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in self.rows.iter() {
            for (cidx, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(cidx) {
                    *w = (*w).max(cell.chars().count());
                }
            }
        }
        widths
    }
}

pub fn load_data_file(path: &Path) -> Result<LoadedTable, FilterError> {
    let file_type = get_file_type(path)?;
    let frame = match file_type {
        FileType::Csv => load_csv(path)?,
        FileType::Parquet => load_parquet(path)?,
        FileType::Arrow => load_arrow(path)?,
    };

    let start_time = Instant::now();
    let df = frame.collect()?;

    // Every column is converted to strings on its own thread
    let columns: Result<Vec<(String, Vec<String>)>, PolarsError> = df
        .get_column_names()
        .par_iter()
        .map(|name| load_column(&df, name))
        .collect();
    let columns = columns?;

    let nrows = df.height();
    let mut rows = vec![Vec::with_capacity(columns.len()); nrows];
    for (_, data) in columns.iter() {
        for (row, cell) in rows.iter_mut().zip(data.iter()) {
            row.push(cell.clone());
        }
    }
    let headers = columns.into_iter().map(|(name, _)| name).collect::<Vec<_>>();

    info!(
        "Loading {} rows x {} columns took {}ms ...",
        nrows,
        headers.len(),
        start_time.elapsed().as_millis()
    );
    debug!("Columns: {:?}", headers);

    Ok(LoadedTable {
        name: table_name(path),
        headers,
        rows,
    })
}

/// File stem, used as the table id.
pub fn table_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("???")
        .to_string()
}

fn load_column(df: &DataFrame, col_name: &str) -> Result<(String, Vec<String>), PolarsError> {
    let col = df.column(col_name)?.cast(&DataType::String)?;
    let series = col.str()?;
    let data = series
        .into_iter()
        .map(|value| match value {
            Some(s) => display_text(s),
            None => NULL_CELL.to_string(),
        })
        .collect();
    Ok((col_name.to_string(), data))
}

fn display_text(s: &str) -> String {
    s.replace("\r\n", " ↵ ").replace('\n', " ↵ ")
}

fn get_file_type(path: &Path) -> Result<FileType, FilterError> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => FilterError::FileNotFound,
        ErrorKind::PermissionDenied => FilterError::PermissionDenied,
        _ => FilterError::Io(e),
    })?;
    if !metadata.is_file() {
        return Err(FilterError::LoadingFailed("Not a file!".into()));
    }
    detect_file_type(path)
}

fn detect_file_type(path: &Path) -> Result<FileType, FilterError> {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_uppercase())
        .as_deref()
    {
        Some("CSV") => Ok(FileType::Csv),
        Some("PARQUET") | Some("PQ") => Ok(FileType::Parquet),
        Some("ARROW") | Some("IPC") | Some("FEATHER") => Ok(FileType::Arrow),
        _ => Err(FilterError::UnknownFileType),
    }
}

fn load_csv(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyCsvReader::new(PlPath::Local(path.into()))
        .with_has_header(true)
        .finish()
}

fn load_parquet(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_parquet(PlPath::Local(path.into()), ScanArgsParquet::default())
}

fn load_arrow(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_ipc(
        PlPath::Local(path.into()),
        polars::io::ipc::IpcScanOptions,
        UnifiedScanArgs::default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn detects_file_types() {
        assert_eq!(detect_file_type(Path::new("a.csv")).unwrap(), FileType::Csv);
        assert_eq!(detect_file_type(Path::new("a.PQ")).unwrap(), FileType::Parquet);
        assert_eq!(detect_file_type(Path::new("a.feather")).unwrap(), FileType::Arrow);
        assert!(matches!(
            detect_file_type(Path::new("a.txt")),
            Err(FilterError::UnknownFileType)
        ));
    }

    #[test]
    fn missing_file() {
        let err = load_data_file(Path::new("does/not/exist.csv")).unwrap_err();
        assert!(matches!(err, FilterError::FileNotFound));
    }

    #[test]
    fn loads_csv_as_rows() {
        let path = std::env::temp_dir().join(format!("ft_loader_{}.csv", std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "status,name").unwrap();
        writeln!(file, "Open,Alice").unwrap();
        writeln!(file, "Closed,").unwrap();
        drop(file);

        let table = load_data_file(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(table.headers, vec!["status", "name"]);
        assert_eq!(
            table.rows,
            vec![vec!["Open", "Alice"], vec!["Closed", NULL_CELL]]
        );
        assert_eq!(table.column_widths(), vec![6, 5]);
    }

    #[test]
    fn newlines_are_flattened() {
        assert_eq!(display_text("a\nb\r\nc"), "a ↵ b ↵ c");
    }
}
