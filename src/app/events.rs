use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};

use super::actions::Action;
use super::state::{Screen, State};
use crate::constants::PAN_STEP;

/// Map a terminal event to an action. `None` means quit.
pub fn handle_event(event: &Event, state: &State) -> Option<Action> {
    match event {
        Event::Key(key) => {
            if key.kind == KeyEventKind::Release {
                return Some(Action::None);
            }
            let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
            let alt = key.modifiers.contains(KeyModifiers::ALT);

            // Global Ctrl shortcuts (always handled first)
            if ctrl {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Char('c') => return None,
                    KeyCode::Char('n') => return Some(Action::NewConversation),
                    _ => return Some(Action::None),
                }
            }

            let graph = state.screen == Screen::Graph;
            let action = match key.code {
                KeyCode::Enter => Action::Submit,
                KeyCode::Tab if graph => Action::SelectNext,
                KeyCode::BackTab if graph => Action::SelectPrev, // Shift+Tab on most terminals
                // Arrows pan the graph; Alt+arrows move the cursor
                KeyCode::Left if graph && !alt => Action::Pan { dx: -PAN_STEP, dy: 0.0 },
                KeyCode::Right if graph && !alt => Action::Pan { dx: PAN_STEP, dy: 0.0 },
                KeyCode::Up if graph => Action::Pan { dx: 0.0, dy: -PAN_STEP },
                KeyCode::Down if graph => Action::Pan { dx: 0.0, dy: PAN_STEP },
                KeyCode::Left => Action::CursorLeft,
                KeyCode::Right => Action::CursorRight,
                KeyCode::Home => Action::CursorHome,
                KeyCode::End => Action::CursorEnd,
                KeyCode::Backspace => Action::InputBackspace,
                KeyCode::Delete => Action::InputDelete,
                KeyCode::Char(c) => Action::InputChar(c),
                _ => Action::None,
            };
            Some(action)
        }
        // Normalize line endings: terminals may send \r\n or \r instead of \n
        Event::Paste(text) => {
            let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
            Some(Action::PasteText(normalized))
        }
        Event::Resize(..) => Some(Action::Redraw),
        _ => Some(Action::None),
    }
}

#[cfg(test)]
mod tests {
    use bf_core::Session;
    use crossterm::event::KeyEvent;

    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    fn state(screen: Screen) -> State {
        let mut state = State::new(Session::default(), "test", true);
        state.screen = screen;
        state
    }

    #[test]
    fn ctrl_shortcuts() {
        let s = state(Screen::Graph);
        assert_eq!(handle_event(&key(KeyCode::Char('q'), KeyModifiers::CONTROL), &s), None);
        assert_eq!(
            handle_event(&key(KeyCode::Char('n'), KeyModifiers::CONTROL), &s),
            Some(Action::NewConversation)
        );
    }

    #[test]
    fn arrows_pan_in_graph_and_edit_on_login() {
        let graph = state(Screen::Graph);
        let login = state(Screen::Login);
        assert_eq!(
            handle_event(&key(KeyCode::Left, KeyModifiers::NONE), &graph),
            Some(Action::Pan { dx: -PAN_STEP, dy: 0.0 })
        );
        assert_eq!(handle_event(&key(KeyCode::Left, KeyModifiers::ALT), &graph), Some(Action::CursorLeft));
        assert_eq!(handle_event(&key(KeyCode::Left, KeyModifiers::NONE), &login), Some(Action::CursorLeft));
        assert_eq!(handle_event(&key(KeyCode::Tab, KeyModifiers::NONE), &login), Some(Action::None));
    }

    #[test]
    fn tab_cycles_selection() {
        let s = state(Screen::Graph);
        assert_eq!(handle_event(&key(KeyCode::Tab, KeyModifiers::NONE), &s), Some(Action::SelectNext));
        assert_eq!(handle_event(&key(KeyCode::BackTab, KeyModifiers::SHIFT), &s), Some(Action::SelectPrev));
    }

    #[test]
    fn paste_normalizes_line_endings() {
        let s = state(Screen::Graph);
        assert_eq!(handle_event(&Event::Paste("a\r\nb\rc".into()), &s), Some(Action::PasteText("a\nb\nc".into())));
    }
}
