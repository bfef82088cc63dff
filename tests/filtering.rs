//! End to end filtering through the public binding api.

use std::path::Path;

use filtertable::binding::SELECT_ALL_LABEL;
use filtertable::loader::load_data_file;
use filtertable::{
    ColumnId, ColumnSpec, FilterCommand, FilterContext, FilterError, SearchId, TableBinding,
    TableSpec, TextSearchSpec,
};
use pretty_assertions::assert_eq;

const STATUS: ColumnId = ColumnId(0);
const NAME: ColumnId = ColumnId(1);

fn rows() -> Vec<Vec<String>> {
    [
        ["Open", "Alice"],
        ["Closed", "Bob"],
        ["Open", "Clocktower"],
    ]
    .iter()
    .map(|r| r.iter().map(|c| c.to_string()).collect())
    .collect()
}

fn spec() -> TableSpec {
    TableSpec {
        id: "tickets".to_string(),
        columns: vec![ColumnSpec::new("Status", true), ColumnSpec::new("Name", false)],
    }
}

fn bind(searches: &[TextSearchSpec]) -> TableBinding {
    TableBinding::new(&FilterContext::initialized(), &spec(), &rows(), searches).unwrap()
}

fn set_text(binding: &mut TableBinding, search: usize, text: &str) {
    binding
        .apply(FilterCommand::SetText {
            search: SearchId(search),
            text: text.to_string(),
        })
        .unwrap();
}

fn toggle(binding: &mut TableBinding, value: &str, visible: bool) -> Option<bool> {
    binding
        .apply(FilterCommand::ToggleCategory {
            column: STATUS,
            value: value.to_string(),
            visible,
        })
        .unwrap()
        .select_all
}

fn select_all(binding: &mut TableBinding, visible: bool) {
    binding
        .apply(FilterCommand::ToggleSelectAll {
            column: STATUS,
            visible,
        })
        .unwrap();
}

#[test]
fn status_and_name_search_for_clo() {
    let mut binding = bind(&[TextSearchSpec::new("tickets", "Status,Name")]);
    set_text(&mut binding, 0, "clo");
    // Closed/Bob matches on status, Open/Clocktower on name
    assert_eq!(binding.recompute(&rows()), vec![false, true, true]);
}

#[test]
fn text_filter_is_case_insensitive() {
    let rows = vec![vec!["Open".to_string(), "barFOObaz".to_string()]];
    let mut binding = bind(&[TextSearchSpec::new("tickets", "Name")]);
    set_text(&mut binding, 0, "Foo");
    assert_eq!(binding.recompute(&rows), vec![true]);
}

#[test]
fn separate_searches_are_or_combined() {
    let mut binding = bind(&[
        TextSearchSpec::new("tickets", "Status"),
        TextSearchSpec::new("tickets", "Name"),
    ]);
    set_text(&mut binding, 0, "closed");
    set_text(&mut binding, 1, "alice");
    assert_eq!(binding.recompute(&rows()), vec![true, true, false]);
}

#[test]
fn categories_and_text_both_have_to_pass() {
    let mut binding = bind(&[TextSearchSpec::new("tickets", "Status,Name")]);
    set_text(&mut binding, 0, "clo");
    toggle(&mut binding, "Closed", false);
    assert_eq!(binding.recompute(&rows()), vec![false, false, true]);

    set_text(&mut binding, 0, "");
    assert_eq!(binding.recompute(&rows()), vec![true, false, true]);
}

#[test]
fn select_all_off_hides_everything_and_on_restores() {
    let mut binding = bind(&[TextSearchSpec::new("tickets", "Name")]);
    set_text(&mut binding, 0, "o");
    let before = binding.recompute(&rows());

    select_all(&mut binding, false);
    assert_eq!(binding.recompute(&rows()), vec![false, false, false]);

    select_all(&mut binding, true);
    assert_eq!(binding.recompute(&rows()), before);
}

#[test]
fn select_all_follows_individual_toggles() {
    let mut binding = bind(&[]);
    select_all(&mut binding, false);

    assert_eq!(toggle(&mut binding, "Closed", true), Some(false));
    assert_eq!(toggle(&mut binding, "Open", true), Some(true));
    assert_eq!(toggle(&mut binding, "Open", false), Some(false));

    let options = binding.column_options(STATUS);
    assert_eq!(options[0].label, SELECT_ALL_LABEL);
    assert!(!options[0].checked);
}

#[test]
fn repeated_evaluation_gives_same_rows() {
    let mut binding = bind(&[]);
    toggle(&mut binding, "Open", false);
    let first = binding.recompute(&rows());
    assert_eq!(binding.recompute(&rows()), first);
}

#[test]
fn stale_value_is_ignored() {
    let mut binding = bind(&[]);
    toggle(&mut binding, "Open", false);
    let before = binding.recompute(&rows());

    let outcome = binding
        .apply(FilterCommand::ToggleCategory {
            column: STATUS,
            value: "Archived".to_string(),
            visible: false,
        })
        .unwrap();
    assert!(!outcome.applied);
    assert_eq!(binding.recompute(&rows()), before);
    assert!(binding.registry().is_category_visible(STATUS, "Closed"));
    assert!(binding.registry().is_category_visible(NAME, "Alice"));
}

#[test]
fn binding_needs_initialized_context() {
    let ctx = FilterContext::new();
    let result = TableBinding::new(&ctx, &spec(), &rows(), &[]);
    assert!(matches!(result, Err(FilterError::NotInitialized { .. })));
}

#[test]
fn search_on_missing_column_is_a_configuration_error() {
    let result = TableBinding::new(
        &FilterContext::initialized(),
        &spec(),
        &rows(),
        &[TextSearchSpec::new("tickets", "Owner")],
    );
    assert!(matches!(result, Err(FilterError::UnknownColumn { .. })));
}

#[test]
fn filters_a_loaded_csv() {
    let table = load_data_file(Path::new("tests/fixtures/tickets.csv")).unwrap();
    let spec = TableSpec {
        id: table.name.clone(),
        columns: table
            .headers
            .iter()
            .map(|h| ColumnSpec::new(h, h == "status" || h == "owner"))
            .collect(),
    };
    let searches = [TextSearchSpec::new("tickets", "name, owner")];
    let mut binding =
        TableBinding::new(&FilterContext::initialized(), &spec, &table.rows, &searches).unwrap();

    let status = binding.column_id("status").unwrap();
    let labels: Vec<String> = binding
        .column_options(status)
        .into_iter()
        .map(|o| o.label)
        .collect();
    assert_eq!(labels, vec![SELECT_ALL_LABEL, "Closed", "Open", "Pending"]);

    set_text(&mut binding, 0, "CLO");
    assert_eq!(
        binding.recompute(&table.rows),
        vec![false, false, true, false, true]
    );

    binding
        .apply(FilterCommand::ToggleCategory {
            column: status,
            value: "Closed".to_string(),
            visible: false,
        })
        .unwrap();
    assert_eq!(
        binding.recompute(&table.rows),
        vec![false, false, true, false, false]
    );
}
