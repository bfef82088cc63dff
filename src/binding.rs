//! Binding of a filter registry to one table.
//!
//! The view describes the table once ([`TableSpec`], [`TextSearchSpec`]) and
//! afterwards only sends [`FilterCommand`]s and asks for a fresh visibility
//! pass over its rows.

use tracing::{debug, trace};

use crate::context::FilterContext;
use crate::domain::FilterError;
use crate::evaluator;
use crate::registry::{ColumnId, FilterRegistry};

/// Label of the aggregate option in a category dropdown.
pub const SELECT_ALL_LABEL: &str = "(Select All)";

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub id: String,
    pub filterable: bool,
}

impl ColumnSpec {
    pub fn new(id: impl Into<String>, filterable: bool) -> Self {
        Self {
            id: id.into(),
            filterable,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableSpec {
    pub id: String,
    pub columns: Vec<ColumnSpec>,
}

/// A search box: the table it belongs to and a comma separated list of the
/// column ids it searches in.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSearchSpec {
    pub table_id: String,
    pub column_ids: String,
}

impl TextSearchSpec {
    pub fn new(table_id: impl Into<String>, column_ids: impl Into<String>) -> Self {
        Self {
            table_id: table_id.into(),
            column_ids: column_ids.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct TextSearch {
    pub label: String,
    pub columns: Vec<ColumnId>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterCommand {
    ToggleCategory {
        column: ColumnId,
        value: String,
        visible: bool,
    },
    ToggleSelectAll {
        column: ColumnId,
        visible: bool,
    },
    SetText {
        search: SearchId,
        text: String,
    },
    ClearAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOutcome {
    /// False if the command referenced state that no longer exists.
    pub applied: bool,
    /// Derived select-all state of the column a categorical command touched.
    pub select_all: Option<bool>,
}

/// One entry of a category dropdown, select-all first.
#[derive(Debug, Clone, PartialEq)]
pub struct DropdownOption {
    pub label: String,
    pub checked: bool,
    pub is_select_all: bool,
}

#[derive(Debug)]
pub struct TableBinding {
    id: String,
    columns: Vec<ColumnSpec>,
    registry: FilterRegistry,
    searches: Vec<TextSearch>,
}

impl TableBinding {
    /// Snapshots the distinct values of every filterable column and resolves
    /// the text searches that target this table.
    ///
    /// Fails if the context was never initialized or a search names a column
    /// the table does not have.
    pub fn new<R, S>(
        ctx: &FilterContext,
        spec: &TableSpec,
        rows: &[R],
        searches: &[TextSearchSpec],
    ) -> Result<Self, FilterError>
    where
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        if !ctx.is_initialized() {
            return Err(FilterError::NotInitialized {
                table: spec.id.clone(),
            });
        }

        let mut registry = FilterRegistry::new();
        for (cidx, column) in spec.columns.iter().enumerate() {
            if column.filterable {
                registry.init_category_column(ColumnId(cidx), distinct_values(rows, cidx))?;
            }
        }

        let mut resolved = Vec::new();
        for search in searches.iter().filter(|s| s.table_id == spec.id) {
            let columns = search
                .column_ids
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(|id| {
                    column_position(&spec.columns, id).ok_or_else(|| FilterError::UnknownColumn {
                        table: spec.id.clone(),
                        column: id.to_string(),
                    })
                })
                .collect::<Result<Vec<ColumnId>, FilterError>>()?;
            resolved.push(TextSearch {
                label: search.column_ids.clone(),
                columns,
                text: String::new(),
            });
        }

        debug!(
            "Bound table {} with {} columns, {} text searches",
            spec.id,
            spec.columns.len(),
            resolved.len()
        );

        Ok(Self {
            id: spec.id.clone(),
            columns: spec.columns.clone(),
            registry,
            searches: resolved,
        })
    }

    pub fn apply(&mut self, command: FilterCommand) -> Result<CommandOutcome, FilterError> {
        trace!("Apply {command:?} on table {}", self.id);
        let outcome = match command {
            FilterCommand::ToggleCategory {
                column,
                value,
                visible,
            } => {
                let applied = self.registry.set_category_visible(column, &value, visible);
                CommandOutcome {
                    applied,
                    select_all: Some(self.registry.is_all_categories_visible(column)),
                }
            }
            FilterCommand::ToggleSelectAll { column, visible } => {
                let applied = self.registry.has_categories(column);
                self.registry.set_all_categories_visible(column, visible);
                CommandOutcome {
                    applied,
                    select_all: Some(self.registry.is_all_categories_visible(column)),
                }
            }
            FilterCommand::SetText { search, text } => {
                let target = self
                    .searches
                    .get_mut(search.0)
                    .ok_or(FilterError::UnknownTextSearch(search.0))?;
                self.registry.set_text_filter(&target.columns, &text);
                target.text = text;
                CommandOutcome {
                    applied: true,
                    select_all: None,
                }
            }
            FilterCommand::ClearAll => {
                self.registry.reset();
                self.searches.iter_mut().for_each(|s| s.text.clear());
                CommandOutcome {
                    applied: true,
                    select_all: None,
                }
            }
        };
        Ok(outcome)
    }

    /// Visibility of each row under the current filters.
    pub fn recompute<R, S>(&self, rows: &[R]) -> Vec<bool>
    where
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        evaluator::evaluate(&self.registry, rows)
    }

    pub fn column_options(&self, column: ColumnId) -> Vec<DropdownOption> {
        if !self.registry.has_categories(column) {
            return Vec::new();
        }
        let mut options = vec![DropdownOption {
            label: SELECT_ALL_LABEL.to_string(),
            checked: self.registry.is_all_categories_visible(column),
            is_select_all: true,
        }];
        options.extend(
            self.registry
                .categories(column)
                .into_iter()
                .map(|(value, visible)| DropdownOption {
                    label: value.to_string(),
                    checked: visible,
                    is_select_all: false,
                }),
        );
        options
    }

    pub fn column_id(&self, id: &str) -> Option<ColumnId> {
        column_position(&self.columns, id)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn registry(&self) -> &FilterRegistry {
        &self.registry
    }

    pub fn searches(&self) -> &[TextSearch] {
        &self.searches
    }
}

/// Ids are compared trimmed, loaded headers may keep the blanks around them.
fn column_position(columns: &[ColumnSpec], id: &str) -> Option<ColumnId> {
    let id = id.trim();
    columns.iter().position(|c| c.id.trim() == id).map(ColumnId)
}

/// Sorted distinct trimmed texts of one column.
fn distinct_values<R, S>(rows: &[R], cidx: usize) -> Vec<String>
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let mut values: Vec<String> = rows
        .iter()
        .filter_map(|row| row.as_ref().get(cidx))
        .map(|cell| cell.as_ref().trim().to_string())
        .collect();
    values.sort_unstable();
    values.dedup();
    values
}
