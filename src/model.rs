use arboard::Clipboard;
use ratatui::crossterm::event::KeyEvent;
use std::time::Instant;
use tracing::{debug, error, trace};

use crate::binding::{DropdownOption, FilterCommand, SearchId, TableBinding};
use crate::domain::{FilterError, HELP_TEXT, Message, TableConfig};
use crate::inputter::Inputter;
use crate::loader::LoadedTable;
use crate::registry::ColumnId;
use crate::ui::{
    CMDLINE_HEIGH, COLUMN_SPACING, COLUMN_WIDTH_MARGIN, FILTER_MARKER, TABLE_HEADER_HEIGHT,
};

#[derive(Debug, PartialEq)]
pub enum Status {
    Ready,
    Quitting,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    Table,
    Dropdown,
    Search,
    Popup,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColumnView {
    pub name: String,
    pub width: usize,
    pub data: Vec<String>,
    pub filtered: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DropdownData {
    pub title: String,
    pub options: Vec<DropdownOption>,
    pub selected: usize, // Relative to options
    pub x: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SearchLine {
    pub label: String,
    pub text: String,
    pub active: bool,
    pub curser_pos: usize,
}

/// Everything the ui needs to render one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct UIData {
    pub name: String,
    pub table: Vec<ColumnView>,
    pub selected_row: usize,
    pub selected_column: usize,
    pub visible_rows: usize,
    pub total_rows: usize,
    pub dropdown: Option<DropdownData>,
    pub searches: Vec<SearchLine>,
    pub popup_message: Option<String>,
    pub status_message: String,
}

/// Category dropdown of one column. Options are re-read from the binding
/// after every toggle, so select-all always mirrors the registry.
struct DropdownView {
    column: ColumnId,
    options: Vec<DropdownOption>,
    curser_row: usize,
    curser_offset: usize,
}

pub struct Model {
    config: TableConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    binding: TableBinding,
    name: String,
    headers: Vec<String>,
    column_widths: Vec<usize>,
    rows: Vec<Vec<String>>,
    visible: Vec<usize>, // Indices into rows that pass the filters
    curser_row: usize,
    offset_row: usize,
    curser_column: usize, // Absolute column index
    offset_column: usize,
    dropdown: Option<DropdownView>,
    active_search: usize,
    input: Inputter,
    clipboard: Option<Clipboard>,
    status_message: String,
    width: usize,
    height: usize,
}

impl Model {
    pub fn new(
        binding: TableBinding,
        table: LoadedTable,
        config: &TableConfig,
        width: usize,
        height: usize,
    ) -> Self {
        let column_widths = table
            .column_widths()
            .into_iter()
            .enumerate()
            .map(|(cidx, w)| {
                let header = table.headers[cidx].chars().count();
                let marker = if binding.registry().has_categories(ColumnId(cidx)) {
                    FILTER_MARKER.chars().count()
                } else {
                    0
                };
                w.max(header + marker) + COLUMN_WIDTH_MARGIN
            })
            .collect();

        let mut model = Self {
            config: config.clone(),
            status: Status::Ready,
            modus: Modus::Table,
            previous_modus: Modus::Table,
            binding,
            name: table.name,
            headers: table.headers,
            column_widths,
            rows: table.rows,
            visible: Vec::new(),
            curser_row: 0,
            offset_row: 0,
            curser_column: 0,
            offset_column: 0,
            dropdown: None,
            active_search: 0,
            input: Inputter::default(),
            clipboard: None,
            status_message: String::new(),
            width,
            height,
        };
        model.refilter();
        model
    }

    pub fn update(&mut self, message: Message) -> Result<(), FilterError> {
        trace!("Update: Modus {:?}, Message {:?}", self.modus, message);
        if let Message::Resize(width, height) = message {
            self.ui_resize(width, height);
            return Ok(());
        }

        match self.modus {
            Modus::Table => match message {
                Message::Quit => self.quit(),
                Message::MoveUp => self.move_table_selection_up(1),
                Message::MoveDown => self.move_table_selection_down(1),
                Message::MovePageUp => self.move_table_selection_up(self.table_height()),
                Message::MovePageDown => self.move_table_selection_down(self.table_height()),
                Message::MoveBeginning => self.select_row(0),
                Message::MoveEnd => self.select_row(self.visible.len().saturating_sub(1)),
                Message::MoveLeft => self.move_table_selection_left(),
                Message::MoveRight => self.move_table_selection_right(),
                Message::Enter | Message::ToggleOption => self.open_dropdown(),
                Message::Search => self.enter_search(0),
                Message::NextSearch => {
                    let next = self.active_search + 1;
                    self.enter_search(next)
                }
                Message::ClearFilters => self.clear_filters()?,
                Message::CopyVisible => self.copy_visible_rows(),
                Message::Help => self.show_help(),
                _ => (),
            },
            Modus::Dropdown => match message {
                Message::Quit => self.quit(),
                Message::MoveUp => self.move_dropdown_selection_up(1),
                Message::MoveDown => self.move_dropdown_selection_down(1),
                Message::MovePageUp => self.move_dropdown_selection_up(self.dropdown_height()),
                Message::MovePageDown => {
                    self.move_dropdown_selection_down(self.dropdown_height())
                }
                Message::Enter | Message::ToggleOption => self.toggle_dropdown_option()?,
                Message::Exit => self.exit(),
                _ => (),
            },
            Modus::Search => {
                if let Message::RawKey(key) = message {
                    self.raw_input(key)?;
                }
            }
            Modus::Popup => match message {
                Message::Quit => self.quit(),
                Message::Exit | Message::Enter => self.exit(),
                _ => (),
            },
        }
        Ok(())
    }

    /// True while key presses go straight into the search box.
    pub fn raw_keyevents(&self) -> bool {
        self.modus == Modus::Search
    }

    pub fn quit(&mut self) {
        self.status = Status::Quitting;
    }

    pub fn visible_rows(&self) -> &[usize] {
        &self.visible
    }

    pub fn binding(&self) -> &TableBinding {
        &self.binding
    }

    pub fn uidata(&self) -> UIData {
        let columns = self.visible_columns();
        let rbegin = self.offset_row;
        let rend = std::cmp::min(rbegin + self.table_height(), self.visible.len());

        let table = columns
            .iter()
            .map(|&cidx| {
                let column = ColumnId(cidx);
                let mut name = self.headers[cidx].clone();
                if self.binding.registry().has_categories(column) {
                    name.push_str(FILTER_MARKER);
                }
                ColumnView {
                    name,
                    width: self.render_width(cidx),
                    data: self.visible[rbegin..rend]
                        .iter()
                        .map(|&ridx| self.rows[ridx].get(cidx).cloned().unwrap_or_default())
                        .collect(),
                    filtered: self.binding.registry().is_column_restricted(column),
                }
            })
            .collect();

        let dropdown = self.dropdown.as_ref().map(|dropdown| {
            let x = columns
                .iter()
                .take_while(|&&cidx| cidx != dropdown.column.0)
                .map(|&cidx| self.render_width(cidx) + COLUMN_SPACING)
                .sum();
            let end = std::cmp::min(
                dropdown.curser_offset + self.dropdown_height(),
                dropdown.options.len(),
            );
            DropdownData {
                title: format!(" {} ", self.headers[dropdown.column.0]),
                options: dropdown.options[dropdown.curser_offset..end].to_vec(),
                selected: dropdown.curser_row,
                x,
            }
        });

        let searches = self
            .binding
            .searches()
            .iter()
            .enumerate()
            .map(|(idx, search)| {
                let active = self.modus == Modus::Search && idx == self.active_search;
                SearchLine {
                    label: format!("/{}", search.label),
                    text: search.text.clone(),
                    active,
                    curser_pos: if active { self.input.get().curser_pos } else { 0 },
                }
            })
            .collect();

        UIData {
            name: self.name.clone(),
            table,
            selected_row: self.curser_row,
            selected_column: self.curser_column - self.offset_column,
            visible_rows: self.visible.len(),
            total_rows: self.rows.len(),
            dropdown,
            searches,
            popup_message: (self.modus == Modus::Popup).then(|| HELP_TEXT.to_string()),
            status_message: self.status_message.clone(),
        }
    }

    // -------------------- Filtering ---------------------- //

    fn apply(&mut self, command: FilterCommand) -> Result<bool, FilterError> {
        let outcome = self.binding.apply(command)?;
        if !outcome.applied {
            debug!("Command did not change any filter");
        }
        self.refilter();
        Ok(outcome.applied)
    }

    /// Re-evaluates every row and keeps the curser on a visible row.
    fn refilter(&mut self) {
        let start_time = Instant::now();
        self.visible = self
            .binding
            .recompute(&self.rows)
            .into_iter()
            .enumerate()
            .filter_map(|(ridx, visible)| visible.then_some(ridx))
            .collect();
        trace!(
            "Filter pass over {} rows took {}ms",
            self.rows.len(),
            start_time.elapsed().as_millis()
        );

        let current = self.offset_row + self.curser_row;
        self.offset_row = 0;
        self.curser_row = 0;
        self.select_row(std::cmp::min(current, self.visible.len().saturating_sub(1)));
        self.set_status_message(format!(
            "{} of {} rows visible",
            self.visible.len(),
            self.rows.len()
        ));
    }

    fn open_dropdown(&mut self) {
        let column = ColumnId(self.curser_column);
        let options = self.binding.column_options(column);
        if options.is_empty() {
            let name = self
                .headers
                .get(self.curser_column)
                .cloned()
                .unwrap_or_default();
            self.set_status_message(format!("Column {name} has no category filter"));
            return;
        }
        trace!("Open dropdown for column {column}");
        self.dropdown = Some(DropdownView {
            column,
            options,
            curser_row: 0,
            curser_offset: 0,
        });
        self.previous_modus = self.modus;
        self.modus = Modus::Dropdown;
    }

    fn toggle_dropdown_option(&mut self) -> Result<(), FilterError> {
        let Some(dropdown) = self.dropdown.as_ref() else {
            return Ok(());
        };
        let column = dropdown.column;
        let option = &dropdown.options[dropdown.curser_offset + dropdown.curser_row];
        let command = if option.is_select_all {
            FilterCommand::ToggleSelectAll {
                column,
                visible: !option.checked,
            }
        } else {
            FilterCommand::ToggleCategory {
                column,
                value: option.label.clone(),
                visible: !option.checked,
            }
        };

        if !self.apply(command)? {
            self.set_status_message("Filter value no longer exists");
        }
        let options = self.binding.column_options(column);
        if let Some(dropdown) = self.dropdown.as_mut() {
            dropdown.options = options;
        }
        Ok(())
    }

    fn enter_search(&mut self, idx: usize) {
        let searches = self.binding.searches();
        if searches.is_empty() {
            self.set_status_message("No text search configured");
            return;
        }
        let idx = idx % searches.len();
        trace!("Entering search {idx} ...");
        self.input.set(&searches[idx].text);
        self.active_search = idx;
        self.previous_modus = self.modus;
        self.modus = Modus::Search;
    }

    fn raw_input(&mut self, key: KeyEvent) -> Result<(), FilterError> {
        let before = self.input.get();
        let result = self.input.read(key);
        if result.input != before.input {
            self.apply(FilterCommand::SetText {
                search: SearchId(self.active_search),
                text: result.input.clone(),
            })?;
        }
        if result.finished {
            self.modus = self.previous_modus;
            self.previous_modus = Modus::Search;
        }
        Ok(())
    }

    fn clear_filters(&mut self) -> Result<(), FilterError> {
        self.apply(FilterCommand::ClearAll)?;
        self.set_status_message("Cleared all filters");
        Ok(())
    }

    // -------------------- Control handling functions ---------------------- //

    fn exit(&mut self) {
        match self.modus {
            Modus::Dropdown => {
                self.dropdown = None;
                self.modus = Modus::Table;
            }
            Modus::Popup => {
                trace!("Close popup ...");
                self.modus = self.previous_modus;
            }
            Modus::Table | Modus::Search => {}
        }
        self.previous_modus = Modus::Table;
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::Popup;
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!(
            "UI was resized! w:{}->{}, h:{}->{}",
            self.width, width, self.height, height
        );
        self.width = width;
        self.height = height;
        let current = self.offset_row + self.curser_row;
        self.select_row(current);
        self.scroll_to_curser_column();
    }

    fn table_height(&self) -> usize {
        self.height
            .saturating_sub(TABLE_HEADER_HEIGHT + CMDLINE_HEIGH)
            .max(1)
    }

    fn dropdown_height(&self) -> usize {
        // Two lines of border
        self.table_height().saturating_sub(3).max(1)
    }

    fn render_width(&self, cidx: usize) -> usize {
        std::cmp::min(self.column_widths[cidx], self.config.max_column_width)
    }

    /// Columns starting at the column offset that fit the screen, at least one.
    fn visible_columns(&self) -> Vec<usize> {
        let mut columns = Vec::new();
        let mut used = 0;
        for cidx in self.offset_column..self.headers.len() {
            let width = self.render_width(cidx) + COLUMN_SPACING;
            if used + width > self.width && !columns.is_empty() {
                break;
            }
            columns.push(cidx);
            used += width;
        }
        columns
    }

    fn select_row(&mut self, row: usize) {
        if self.visible.is_empty() {
            self.offset_row = 0;
            self.curser_row = 0;
            return;
        }
        let row = std::cmp::min(row, self.visible.len() - 1);
        let height = self.table_height();
        if row < self.offset_row {
            self.offset_row = row;
        } else if row >= self.offset_row + height {
            self.offset_row = row + 1 - height;
        }
        self.curser_row = row - self.offset_row;
    }

    fn move_table_selection_up(&mut self, size: usize) {
        let row = (self.offset_row + self.curser_row).saturating_sub(size);
        self.select_row(row);
    }

    fn move_table_selection_down(&mut self, size: usize) {
        let row = self.offset_row + self.curser_row + size;
        self.select_row(row);
    }

    fn move_table_selection_left(&mut self) {
        if self.curser_column > 0 {
            self.curser_column -= 1;
            if self.curser_column < self.offset_column {
                self.offset_column = self.curser_column;
            }
        }
    }

    fn move_table_selection_right(&mut self) {
        if self.curser_column + 1 < self.headers.len() {
            self.curser_column += 1;
            self.scroll_to_curser_column();
        }
    }

    fn scroll_to_curser_column(&mut self) {
        if self.headers.is_empty() {
            return;
        }
        // The offset column is always visible, so this stops at the curser
        while self.offset_column < self.curser_column
            && !self.visible_columns().contains(&self.curser_column)
        {
            self.offset_column += 1;
        }
    }

    fn move_dropdown_selection_up(&mut self, size: usize) {
        if let Some(dropdown) = self.dropdown.as_mut() {
            let row = (dropdown.curser_offset + dropdown.curser_row).saturating_sub(size);
            if row < dropdown.curser_offset {
                dropdown.curser_offset = row;
            }
            dropdown.curser_row = row - dropdown.curser_offset;
        }
    }

    fn move_dropdown_selection_down(&mut self, size: usize) {
        let height = self.dropdown_height();
        if let Some(dropdown) = self.dropdown.as_mut() {
            let last = dropdown.options.len().saturating_sub(1);
            let row = std::cmp::min(dropdown.curser_offset + dropdown.curser_row + size, last);
            if row >= dropdown.curser_offset + height {
                dropdown.curser_offset = row + 1 - height;
            }
            dropdown.curser_row = row - dropdown.curser_offset;
        }
    }

    fn wrap_cell_content(c: &str) -> String {
        let needs_escaping = c.contains('"');
        let needs_wrapping = c.chars().any(|c| matches!(c, ' ' | '\t' | ',' | '\n' | '\r'));
        let mut out = String::from(c);

        if needs_escaping {
            out = out.replace('"', "\"\"");
        }
        if needs_wrapping || needs_escaping {
            out = format!("\"{out}\"");
        }
        out
    }

    /// Header plus visible rows as csv.
    fn visible_rows_as_csv(&self) -> String {
        let mut lines = Vec::with_capacity(self.visible.len() + 1);
        lines.push(
            self.headers
                .iter()
                .map(|h| Model::wrap_cell_content(h))
                .collect::<Vec<_>>()
                .join(","),
        );
        for &ridx in self.visible.iter() {
            lines.push(
                self.rows[ridx]
                    .iter()
                    .map(|c| Model::wrap_cell_content(c))
                    .collect::<Vec<_>>()
                    .join(","),
            );
        }
        lines.join("\n")
    }

    fn copy_visible_rows(&mut self) {
        let content = self.visible_rows_as_csv();
        if self.clipboard.is_none() {
            match Clipboard::new() {
                Ok(clipboard) => self.clipboard = Some(clipboard),
                Err(e) => {
                    error!("Could not open clipboard: {:?}", e);
                    self.set_status_message("Clipboard not available");
                    return;
                }
            }
        }
        if let Some(clipboard) = self.clipboard.as_mut() {
            match clipboard.set_text(content) {
                Ok(_) => {
                    let n = self.visible.len();
                    self.set_status_message(format!("Copied {n} rows to clipboard"));
                }
                Err(e) => error!("Error copying to clipboard: {:?}", e),
            }
        }
    }
}
