use std::collections::HashMap;
use std::fmt;

use tracing::{debug, trace};

use crate::domain::FilterError;

/// Position of a column in a row's ordered cell sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnId(pub usize);

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Distinct values of a column, in discovery order, each with its visibility.
#[derive(Debug, Clone, Default)]
struct Categories {
    values: Vec<String>,
    visibility: HashMap<String, bool>,
}

impl Categories {
    fn new<I, S>(distinct_values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut categories = Categories::default();
        for value in distinct_values {
            let value = value.into();
            if !categories.visibility.contains_key(&value) {
                categories.visibility.insert(value.clone(), true);
                categories.values.push(value);
            }
        }
        categories
    }

    fn all_visible(&self) -> bool {
        self.visibility.values().all(|&v| v)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ColumnFilterEntry {
    categories: Option<Categories>,
    text_filter: String,
}

/// Filter state of one table: categorical visibility and text filters per column.
///
/// Columns without an entry are unrestricted.
#[derive(Debug, Clone, Default)]
pub struct FilterRegistry {
    columns: HashMap<ColumnId, ColumnFilterEntry>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the distinct values of a categorical column, all visible.
    ///
    /// A column that only carries a text filter so far keeps it. Calling this
    /// twice for the same column fails and leaves the first snapshot intact.
    pub fn init_category_column<I, S>(
        &mut self,
        column: ColumnId,
        distinct_values: I,
    ) -> Result<(), FilterError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.columns.entry(column).or_default();
        if entry.categories.is_some() {
            return Err(FilterError::CategoryColumnExists(column));
        }
        let categories = Categories::new(distinct_values);
        trace!("Column {column}: {} categories", categories.values.len());
        entry.categories = Some(categories);
        Ok(())
    }

    /// Returns false and changes nothing if the column or value is unknown.
    pub fn set_category_visible(&mut self, column: ColumnId, value: &str, visible: bool) -> bool {
        let slot = self
            .columns
            .get_mut(&column)
            .and_then(|e| e.categories.as_mut())
            .and_then(|c| c.visibility.get_mut(value));
        match slot {
            Some(v) => {
                *v = visible;
                true
            }
            None => {
                debug!("Ignoring stale toggle of {value:?} on column {column}");
                false
            }
        }
    }

    pub fn set_all_categories_visible(&mut self, column: ColumnId, visible: bool) {
        if let Some(categories) = self
            .columns
            .get_mut(&column)
            .and_then(|e| e.categories.as_mut())
        {
            categories
                .visibility
                .values_mut()
                .for_each(|v| *v = visible);
        } else {
            debug!("Ignoring select-all on column {column} without categories");
        }
    }

    pub fn is_all_categories_visible(&self, column: ColumnId) -> bool {
        self.category_entry(column)
            .map(Categories::all_visible)
            .unwrap_or(true)
    }

    /// Lowercases `text` and stores it as the text filter of every listed column.
    pub fn set_text_filter(&mut self, columns: &[ColumnId], text: &str) {
        let text = text.to_lowercase();
        for &column in columns {
            self.columns.entry(column).or_default().text_filter = text.clone();
        }
    }

    /// Unknown columns and values are visible.
    pub fn is_category_visible(&self, column: ColumnId, value: &str) -> bool {
        self.category_entry(column)
            .and_then(|c| c.visibility.get(value).copied())
            .unwrap_or(true)
    }

    pub fn text_filter(&self, column: ColumnId) -> &str {
        self.columns
            .get(&column)
            .map(|e| e.text_filter.as_str())
            .unwrap_or("")
    }

    /// Values of a categorical column in discovery order, with their visibility.
    pub fn categories(&self, column: ColumnId) -> Vec<(&str, bool)> {
        self.category_entry(column)
            .map(|c| {
                c.values
                    .iter()
                    .map(|v| (v.as_str(), c.visibility[v]))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn has_categories(&self, column: ColumnId) -> bool {
        self.category_entry(column).is_some()
    }

    /// True if the column currently hides anything or carries a text filter.
    pub fn is_column_restricted(&self, column: ColumnId) -> bool {
        !self.is_all_categories_visible(column) || !self.text_filter(column).is_empty()
    }

    pub fn has_text_filter(&self) -> bool {
        self.columns.values().any(|e| !e.text_filter.trim().is_empty())
    }

    /// Shows every category and clears every text filter.
    pub fn reset(&mut self) {
        for entry in self.columns.values_mut() {
            if let Some(categories) = entry.categories.as_mut() {
                categories.visibility.values_mut().for_each(|v| *v = true);
            }
            entry.text_filter.clear();
        }
    }

    fn category_entry(&self, column: ColumnId) -> Option<&Categories> {
        self.columns.get(&column).and_then(|e| e.categories.as_ref())
    }
}
