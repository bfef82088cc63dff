//! Row visibility.
//!
//! A row is visible when it passes two independent gates:
//!
//! * the categorical gate: every column with category filters accepts the
//!   row's (trimmed) cell text,
//! * the text gate: if any column has a text filter, at least one column's
//!   cell contains its column's filter, case-insensitively.
//!
//! Text filters are OR-ed across columns, so a search fanned out to several
//! columns keeps a row that matches in any one of them.

use std::time::Instant;

use tracing::trace;

use crate::registry::{ColumnId, FilterRegistry};

pub fn is_row_visible<S: AsRef<str>>(cells: &[S], registry: &FilterRegistry) -> bool {
    passes_categories(cells, registry) && passes_text(cells, registry)
}

fn passes_categories<S: AsRef<str>>(cells: &[S], registry: &FilterRegistry) -> bool {
    cells
        .iter()
        .enumerate()
        .all(|(cidx, cell)| registry.is_category_visible(ColumnId(cidx), cell.as_ref().trim()))
}

fn passes_text<S: AsRef<str>>(cells: &[S], registry: &FilterRegistry) -> bool {
    let mut requested = false;
    let mut matched = false;

    for (cidx, cell) in cells.iter().enumerate() {
        let filter = registry.text_filter(ColumnId(cidx));
        if filter.is_empty() {
            continue;
        }
        // Blank filters can match but never request filtering on their own
        requested |= !filter.trim().is_empty();
        matched |= cell.as_ref().to_lowercase().contains(filter);
    }

    !requested || matched
}

/// Visibility of every row, in row order.
pub fn evaluate<R, S>(registry: &FilterRegistry, rows: &[R]) -> Vec<bool>
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let start_time = Instant::now();
    let visibility: Vec<bool> = rows
        .iter()
        .map(|row| is_row_visible(row.as_ref(), registry))
        .collect();
    trace!(
        "Evaluated {} rows in {}us",
        rows.len(),
        start_time.elapsed().as_micros()
    );
    visibility
}

/// Indices of the visible rows.
pub fn visible_rows<R, S>(registry: &FilterRegistry, rows: &[R]) -> Vec<usize>
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    evaluate(registry, rows)
        .into_iter()
        .enumerate()
        .filter_map(|(ridx, visible)| visible.then_some(ridx))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const STATUS: ColumnId = ColumnId(0);
    const NAME: ColumnId = ColumnId(1);

    fn rows() -> Vec<Vec<&'static str>> {
        vec![
            vec!["Open", "Alice"],
            vec!["Closed", "Bob"],
            vec!["Open", "Clocktower"],
        ]
    }

    fn registry() -> FilterRegistry {
        let mut reg = FilterRegistry::new();
        reg.init_category_column(STATUS, ["Closed", "Open"]).unwrap();
        reg
    }

    #[test]
    fn everything_visible_without_filters() {
        assert_eq!(evaluate(&registry(), &rows()), vec![true, true, true]);
    }

    #[test]
    fn text_search_over_two_columns() {
        let mut reg = registry();
        reg.set_text_filter(&[STATUS, NAME], "clo");
        assert_eq!(evaluate(&reg, &rows()), vec![false, true, true]);
    }

    #[test]
    fn text_filters_are_or_combined() {
        let mut reg = FilterRegistry::new();
        reg.set_text_filter(&[STATUS], "open");
        reg.set_text_filter(&[NAME], "bob");
        // Open/Alice matches on status, Closed/Bob on name
        assert_eq!(evaluate(&reg, &rows()), vec![true, true, true]);

        reg.set_text_filter(&[NAME], "zed");
        assert_eq!(evaluate(&reg, &rows()), vec![true, false, true]);
    }

    #[test]
    fn categories_are_and_combined_with_text() {
        let mut reg = registry();
        reg.set_text_filter(&[STATUS, NAME], "clo");
        reg.set_category_visible(STATUS, "Open", false);
        assert_eq!(evaluate(&reg, &rows()), vec![false, true, false]);

        reg.set_text_filter(&[STATUS, NAME], "");
        reg.set_category_visible(STATUS, "Open", true);
        reg.set_category_visible(STATUS, "Closed", false);
        assert_eq!(evaluate(&reg, &rows()), vec![true, false, true]);
    }

    #[test]
    fn match_is_case_insensitive() {
        let mut reg = FilterRegistry::new();
        reg.set_text_filter(&[NAME], "Foo");
        assert!(is_row_visible(&["x", "barFOObaz"], &reg));
        assert!(!is_row_visible(&["foo", "bar"], &reg));
    }

    #[test]
    fn blank_search_does_not_filter() {
        let mut reg = FilterRegistry::new();
        reg.set_text_filter(&[NAME], "   ");
        assert_eq!(evaluate(&reg, &rows()), vec![true, true, true]);
    }

    #[test]
    fn category_lookup_trims_cells() {
        let mut reg = registry();
        reg.set_category_visible(STATUS, "Open", false);
        assert!(!is_row_visible(&["  Open ", "Alice"], &reg));
    }

    #[test]
    fn values_outside_snapshot_stay_visible() {
        let mut reg = registry();
        reg.set_all_categories_visible(STATUS, false);
        assert!(is_row_visible(&["Pending", "Dora"], &reg));
    }

    #[test]
    fn short_rows_skip_missing_columns() {
        let mut reg = registry();
        reg.set_text_filter(&[NAME], "alice");
        // Name cell is missing, so no filter is consulted
        assert!(is_row_visible(&["Open"], &reg));
    }

    #[test]
    fn repeated_evaluation_is_stable() {
        let mut reg = registry();
        reg.set_category_visible(STATUS, "Closed", false);
        let first = evaluate(&reg, &rows());
        assert_eq!(evaluate(&reg, &rows()), first);
        assert_eq!(visible_rows(&reg, &rows()), vec![0, 2]);
    }
}
