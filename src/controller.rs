use std::time::Duration;
use tracing::trace;

use crate::domain::{FilterError, Message, TableConfig};
use crate::model::Model;
use ratatui::crossterm::event::{self, Event, KeyCode};

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &TableConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, FilterError> {
        if event::poll(Duration::from_millis(self.event_poll_time))? {
            match event::read()? {
                // crossterm also emits key release and repeat events on Windows
                Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                    if model.raw_keyevents() {
                        return Ok(Some(Message::RawKey(key)));
                    }
                    return Ok(self.handle_key(key));
                }
                Event::Resize(width, height) => {
                    return Ok(Some(Message::Resize(width as usize, height as usize)));
                }
                _ => {}
            }
        }
        Ok(None)
    }

    fn handle_key(&self, key: event::KeyEvent) -> Option<Message> {
        let message = match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Esc => Some(Message::Exit),
            KeyCode::Enter => Some(Message::Enter),
            KeyCode::Char(' ') => Some(Message::ToggleOption),
            KeyCode::Char('?') => Some(Message::Help),
            KeyCode::Up | KeyCode::Char('k') => Some(Message::MoveUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Message::MoveDown),
            KeyCode::Left | KeyCode::Char('h') => Some(Message::MoveLeft),
            KeyCode::Right | KeyCode::Char('l') => Some(Message::MoveRight),
            KeyCode::PageUp => Some(Message::MovePageUp),
            KeyCode::PageDown => Some(Message::MovePageDown),
            KeyCode::Home | KeyCode::Char('g') => Some(Message::MoveBeginning),
            KeyCode::End | KeyCode::Char('G') => Some(Message::MoveEnd),
            KeyCode::Char('/') => Some(Message::Search),
            KeyCode::Tab => Some(Message::NextSearch),
            KeyCode::Char('c') => Some(Message::ClearFilters),
            KeyCode::Char('y') => Some(Message::CopyVisible),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::{KeyEvent, KeyModifiers};

    fn map(code: KeyCode) -> Option<Message> {
        Controller::new(&TableConfig::default()).handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn filter_keys() {
        assert_eq!(map(KeyCode::Enter), Some(Message::Enter));
        assert_eq!(map(KeyCode::Char(' ')), Some(Message::ToggleOption));
        assert_eq!(map(KeyCode::Char('/')), Some(Message::Search));
        assert_eq!(map(KeyCode::Tab), Some(Message::NextSearch));
        assert_eq!(map(KeyCode::Char('c')), Some(Message::ClearFilters));
        assert_eq!(map(KeyCode::Esc), Some(Message::Exit));
        assert_eq!(map(KeyCode::Char('x')), None);
    }
}
