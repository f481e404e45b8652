use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::keymap::{KeyBinding, Keymap};

/// Input action that can be performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    ScrollDown,
    ScrollUp,
    ScrollHalfPageDown,
    ScrollHalfPageUp,
    JumpToBottom,
    Elevate,
    CycleTarget,
    ToggleAudio,
    None,
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent, keymap: &Keymap) -> Action {
    let binding = KeyBinding::new(key.code, key.modifiers);
    if let Some(action) = keymap.get(&binding) {
        return *action;
    }

    // Some terminals report "G" without the shift modifier
    if let KeyCode::Char(c) = key.code {
        if c.is_ascii_uppercase() && key.modifiers == KeyModifiers::NONE {
            if let Some(action) = keymap.get(&KeyBinding::shift(key.code)) {
                return *action;
            }
        }
    }

    Action::None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_default_bindings() {
        let keymap = Keymap::default();
        assert_eq!(
            handle_key_event(press(KeyCode::Char('e'), KeyModifiers::NONE), &keymap),
            Action::Elevate
        );
        assert_eq!(
            handle_key_event(press(KeyCode::Char('d'), KeyModifiers::CONTROL), &keymap),
            Action::ScrollHalfPageDown
        );
        assert_eq!(
            handle_key_event(press(KeyCode::Char('x'), KeyModifiers::NONE), &keymap),
            Action::None
        );
    }

    #[test]
    fn test_uppercase_without_shift() {
        let keymap = Keymap::default();
        assert_eq!(
            handle_key_event(press(KeyCode::Char('G'), KeyModifiers::SHIFT), &keymap),
            Action::JumpToBottom
        );
        assert_eq!(
            handle_key_event(press(KeyCode::Char('G'), KeyModifiers::NONE), &keymap),
            Action::JumpToBottom
        );
    }
}
