use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Cell, Clear, List, ListItem, Paragraph, Row, Table, Wrap},
};

use crate::context::Theme;
use crate::model::{DropdownData, Model, UIData};

pub const TABLE_HEADER_HEIGHT: usize = 1;
pub const CMDLINE_HEIGH: usize = 2; // search line + status line
pub const COLUMN_WIDTH_MARGIN: usize = 1;
pub const COLUMN_SPACING: usize = 1;
pub const FILTER_MARKER: &str = " ▾";

const DROPDOWN_MIN_WIDTH: usize = 16;

#[derive(Debug)]
pub struct TableUI {
    theme: Theme,
}

impl TableUI {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn draw(&self, model: &Model, frame: &mut Frame) {
        let uidata = model.uidata();
        let [table_area, search_area, status_area] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        self.render_table(&uidata, frame, table_area);
        self.render_searches(&uidata, frame, search_area);
        self.render_status(&uidata, frame, status_area);

        if let Some(dropdown) = &uidata.dropdown {
            self.render_dropdown(dropdown, frame, table_area);
        }
        if let Some(message) = &uidata.popup_message {
            self.render_popup(message, frame);
        }
    }

    fn render_table(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let header = Row::new(uidata.table.iter().map(|column| {
            let style = if column.filtered {
                self.theme.filtered_header
            } else {
                self.theme.header
            };
            Cell::from(column.name.clone()).style(style)
        }));

        let nrows = uidata.table.first().map(|c| c.data.len()).unwrap_or(0);
        let rows = (0..nrows).map(|ridx| {
            Row::new(uidata.table.iter().enumerate().map(|(cidx, column)| {
                let cell = Cell::from(column.data[ridx].clone());
                if ridx == uidata.selected_row && cidx == uidata.selected_column {
                    cell.style(self.theme.selected)
                } else {
                    cell
                }
            }))
        });
        let widths = uidata
            .table
            .iter()
            .map(|c| Constraint::Length(c.width as u16));

        let table = Table::new(rows, widths)
            .header(header)
            .column_spacing(COLUMN_SPACING as u16);
        frame.render_widget(table, area);
    }

    fn render_searches(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let mut spans = Vec::new();
        let mut x = 0;
        for search in uidata.searches.iter() {
            let prefix = format!(" [{}]: ", search.label);
            let style = if search.active {
                self.theme.search
            } else {
                Style::default()
            };
            if search.active {
                let curser_x = x + prefix.chars().count() + search.curser_pos;
                frame.set_cursor_position((area.x + curser_x as u16, area.y));
            }
            x += prefix.chars().count() + search.text.chars().count();
            spans.push(Span::styled(prefix, style));
            spans.push(Span::styled(search.text.clone(), style));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_status(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let line = format!(
            " {} | {} of {} rows | {}",
            uidata.name, uidata.visible_rows, uidata.total_rows, uidata.status_message
        );
        frame.render_widget(Paragraph::new(line).style(self.theme.status), area);
    }

    fn render_dropdown(&self, dropdown: &DropdownData, frame: &mut Frame, area: Rect) {
        let label_width = dropdown
            .options
            .iter()
            .map(|o| o.label.chars().count())
            .max()
            .unwrap_or(0);
        let width = (label_width + 6)
            .max(DROPDOWN_MIN_WIDTH)
            .min(area.width as usize);
        let height = (dropdown.options.len() + 2).min(area.height.saturating_sub(1) as usize);
        let x = dropdown.x.min((area.width as usize).saturating_sub(width));
        let popup = Rect::new(
            area.x + x as u16,
            area.y + TABLE_HEADER_HEIGHT as u16,
            width as u16,
            height as u16,
        );

        let items: Vec<ListItem> = dropdown
            .options
            .iter()
            .enumerate()
            .map(|(idx, option)| {
                let mark = if option.checked { "[x]" } else { "[ ]" };
                let item = ListItem::new(format!("{mark} {}", option.label));
                if idx == dropdown.selected {
                    item.style(self.theme.selected)
                } else {
                    item
                }
            })
            .collect();

        let list = List::new(items)
            .block(Block::bordered().title(dropdown.title.clone()))
            .style(self.theme.dropdown);
        frame.render_widget(Clear, popup);
        frame.render_widget(list, popup);
    }

    fn render_popup(&self, message: &str, frame: &mut Frame) {
        let area = centered(frame.area(), 60, 60);
        let popup = Paragraph::new(message.to_string())
            .block(Block::bordered().title(" Help "))
            .wrap(Wrap { trim: false });
        frame.render_widget(Clear, area);
        frame.render_widget(popup, area);
    }
}

fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [_, middle, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(area);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(middle);
    center
}
