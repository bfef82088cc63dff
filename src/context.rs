use ratatui::style::{Color, Modifier, Style};
use tracing::debug;

/// Styles shared by every table view.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub header: Style,
    pub filtered_header: Style,
    pub selected: Style,
    pub dropdown: Style,
    pub search: Style,
    pub status: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            header: Style::new().add_modifier(Modifier::BOLD),
            filtered_header: Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            selected: Style::new().bg(Color::Blue).fg(Color::White),
            dropdown: Style::new().bg(Color::DarkGray),
            search: Style::new().fg(Color::Cyan),
            status: Style::new().fg(Color::Gray),
        }
    }
}

/// One-time setup that has to happen before any table is bound.
///
/// Replaces a process-wide "initialized" flag: bindings take the context by
/// reference and refuse to build from one that was never initialized.
#[derive(Debug, Default)]
pub struct FilterContext {
    theme: Option<Theme>,
}

impl FilterContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent, later calls keep the first theme.
    pub fn init(&mut self, theme: Theme) -> &mut Self {
        if self.theme.is_some() {
            debug!("Filter context already initialized");
        } else {
            self.theme = Some(theme);
        }
        self
    }

    pub fn initialized() -> Self {
        let mut ctx = Self::new();
        ctx.init(Theme::default());
        ctx
    }

    pub fn is_initialized(&self) -> bool {
        self.theme.is_some()
    }

    pub fn theme(&self) -> Option<&Theme> {
        self.theme.as_ref()
    }
}
