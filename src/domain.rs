use std::io::Error;

use derive_setters::Setters;
use polars::error::PolarsError;
use ratatui::crossterm::event::KeyEvent;
use thiserror::Error;

use crate::registry::ColumnId;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("filter context must be initialized before binding table `{table}`")]
    NotInitialized { table: String },
    #[error("text search on table `{table}` targets unknown column `{column}`")]
    UnknownColumn { table: String, column: String },
    #[error("column {0} already has a category filter")]
    CategoryColumnExists(ColumnId),
    #[error("no text search with id {0}")]
    UnknownTextSearch(usize),
    #[error(transparent)]
    Io(#[from] Error),
    #[error(transparent)]
    Polars(#[from] PolarsError),
    #[error("loading failed: {0}")]
    LoadingFailed(String),
    #[error("file not found")]
    FileNotFound,
    #[error("permission denied")]
    PermissionDenied,
    #[error("unknown file type")]
    UnknownFileType,
    #[error("logging setup failed: {0}")]
    Logging(String),
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct TableConfig {
    pub event_poll_time: u64,
    pub max_column_width: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
            max_column_width: 40,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    Exit,
    Enter,
    Help,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    MovePageUp,
    MovePageDown,
    MoveBeginning,
    MoveEnd,
    ToggleOption,
    Search,
    NextSearch,
    ClearFilters,
    CopyVisible,
    Resize(usize, usize),
    RawKey(KeyEvent),
}

pub const HELP_TEXT: &str = "\
q         quit
arrows    move (hjkl works too)
PgUp/PgDn move a page
g / G     first / last row
Enter     open the category filter of the current column
Space     toggle the selected value in an open filter
/         edit the first text search
Tab       edit the next text search
c         clear every filter
y         copy the visible rows as csv
Esc       close popup, filter or search
?         this help";
