//! Maps raw key events to chat actions.
//!
//! Resolution depends only on the key and on whether the model picker is
//! open, so the table can be tested without a terminal.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Submit,
    CancelRequest,
    NewChat,
    OpenPicker,
    ClosePicker,
    PickerUp,
    PickerDown,
    PickerSelect,
    PageUp,
    PageDown,
    Quit,
    /// Handed to the input textarea.
    Edit,
    Ignore,
}

pub fn resolve_key(key: &KeyEvent, picker_open: bool) -> KeyAction {
    if key.kind == KeyEventKind::Release {
        return KeyAction::Ignore;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c') if ctrl => return KeyAction::Quit,
        KeyCode::PageUp => return KeyAction::PageUp,
        KeyCode::PageDown => return KeyAction::PageDown,
        _ => {}
    }

    if picker_open {
        return match key.code {
            KeyCode::Esc => KeyAction::ClosePicker,
            KeyCode::Up => KeyAction::PickerUp,
            KeyCode::Down => KeyAction::PickerDown,
            KeyCode::Enter => KeyAction::PickerSelect,
            _ => KeyAction::Ignore,
        };
    }

    match key.code {
        KeyCode::Esc => KeyAction::CancelRequest,
        KeyCode::Char('n') if ctrl => KeyAction::NewChat,
        KeyCode::Char('o') if ctrl => KeyAction::OpenPicker,
        KeyCode::Enter
            if !key
                .modifiers
                .intersects(KeyModifiers::ALT | KeyModifiers::SHIFT) =>
        {
            KeyAction::Submit
        }
        _ => KeyAction::Edit,
    }
}
