//! Row filtering for tabular data.
//!
//! [`binding::TableBinding`] ties a [`registry::FilterRegistry`] to one table:
//! per column category filters (AND across columns) and text searches over one
//! or more columns (OR across columns). The `ft` binary is a terminal view on
//! top of it.

pub mod binding;
pub mod cli;
pub mod context;
pub mod controller;
pub mod domain;
pub mod evaluator;
pub mod inputter;
pub mod loader;
pub mod logging;
pub mod model;
pub mod registry;
pub mod ui;

pub use binding::{
    ColumnSpec, CommandOutcome, FilterCommand, SearchId, TableBinding, TableSpec, TextSearchSpec,
};
pub use context::{FilterContext, Theme};
pub use domain::FilterError;
pub use registry::{ColumnId, FilterRegistry};
