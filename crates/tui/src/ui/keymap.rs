use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    /// Login screen: switch between login and sign-up. Elsewhere: refresh.
    ToggleMode,
    Logout,
    Refresh,
    NextTab,
    PrevTab,
    Cancel,
    NextField,
    Submit,
    Backspace,
    Delete,
    Up,
    Down,
    Input(char),
    None,
}

/// Maps a key press to an action.
///
/// Plain characters always map to [`AppAction::Input`]; whether `q` quits is
/// decided by the screen, since forms need to accept it as text.
pub fn map_key(key: KeyEvent) -> AppAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => AppAction::Quit,
            KeyCode::Char('r') => AppAction::ToggleMode,
            KeyCode::Char('l') => AppAction::Logout,
            _ => AppAction::None,
        };
    }

    match key.code {
        KeyCode::Esc => AppAction::Cancel,
        KeyCode::F(5) => AppAction::Refresh,
        KeyCode::Right => AppAction::NextTab,
        KeyCode::Left => AppAction::PrevTab,
        KeyCode::Tab | KeyCode::BackTab => AppAction::NextField,
        KeyCode::Enter => AppAction::Submit,
        KeyCode::Backspace => AppAction::Backspace,
        KeyCode::Delete => AppAction::Delete,
        KeyCode::Up => AppAction::Up,
        KeyCode::Down => AppAction::Down,
        KeyCode::Char(ch) => AppAction::Input(ch),
        _ => AppAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    #[test]
    fn control_shortcuts() {
        assert_eq!(map_key(ctrl('c')), AppAction::Quit);
        assert_eq!(map_key(ctrl('r')), AppAction::ToggleMode);
        assert_eq!(map_key(ctrl('l')), AppAction::Logout);
        assert_eq!(map_key(ctrl('x')), AppAction::None);
    }

    #[test]
    fn q_is_plain_input() {
        assert_eq!(map_key(press(KeyCode::Char('q'))), AppAction::Input('q'));
    }

    #[test]
    fn navigation_keys() {
        assert_eq!(map_key(press(KeyCode::Right)), AppAction::NextTab);
        assert_eq!(map_key(press(KeyCode::Left)), AppAction::PrevTab);
        assert_eq!(map_key(press(KeyCode::Tab)), AppAction::NextField);
        assert_eq!(map_key(press(KeyCode::Delete)), AppAction::Delete);
        assert_eq!(map_key(press(KeyCode::F(5))), AppAction::Refresh);
        assert_eq!(map_key(press(KeyCode::Home)), AppAction::None);
    }
}
