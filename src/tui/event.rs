//! Event handling module
//!
//! Uses crossterm for terminal event handling.

use crate::session::KeyInput;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

/// Event type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuiEvent {
    /// Key press
    Key(KeyInput),
    /// Window resized; re-measure the viewer
    Resize,
    /// No event (timeout)
    None,
}

impl From<Event> for TuiEvent {
    fn from(event: Event) -> Self {
        match event {
            Event::Key(key_event) => key_event.into(),
            Event::Resize(_, _) => TuiEvent::Resize,
            Event::Mouse(_) => TuiEvent::None,
            Event::FocusGained => TuiEvent::None,
            Event::FocusLost => TuiEvent::None,
            Event::Paste(_) => TuiEvent::None,
        }
    }
}

impl From<KeyEvent> for TuiEvent {
    fn from(key: KeyEvent) -> Self {
        // Ignore non-press events
        if key.kind != KeyEventKind::Press {
            return TuiEvent::None;
        }

        // Handle Ctrl+C and Ctrl+D exit
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('d'))
        {
            return TuiEvent::Key(KeyInput::CtrlC);
        }

        let input = match key.code {
            KeyCode::Esc => KeyInput::Esc,
            KeyCode::Enter => KeyInput::Enter,
            KeyCode::Up => KeyInput::Up,
            KeyCode::Down => KeyInput::Down,
            KeyCode::Left => KeyInput::Left,
            KeyCode::Right => KeyInput::Right,
            KeyCode::Tab => KeyInput::Tab,
            KeyCode::Char(' ') => KeyInput::Space,
            KeyCode::Char(c) => KeyInput::Char(c),
            KeyCode::Modifier(_) => return TuiEvent::None,
            _ => KeyInput::Other,
        };
        TuiEvent::Key(input)
    }
}

/// Wait up to `timeout` for the next terminal event
pub fn poll_event(timeout: Duration) -> std::io::Result<TuiEvent> {
    if event::poll(timeout)? {
        Ok(event::read()?.into())
    } else {
        Ok(TuiEvent::None)
    }
}
