mod graph;
mod helpers;
mod input;
mod login;
mod spinner;
mod theme;

use ratatui::{prelude::*, widgets::Block};

use crate::app::State;
use crate::app::state::Screen;

pub fn render(frame: &mut Frame, state: &State) {
    let area = frame.area();

    // Fill base background
    frame.render_widget(Block::default().style(Style::default().bg(theme::BG_BASE)), area);

    if state.screen == Screen::Login {
        login::render_login(frame, state, area);
        return;
    }

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Graph
            Constraint::Length(3), // Input
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    graph::render_graph(frame, state, main_layout[0]);
    input::render_input(frame, state, main_layout[1]);
    input::render_status_bar(frame, state, main_layout[2]);
}

#[cfg(test)]
mod tests {
    use bf_core::{GenerationReply, Session};
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;
    use crate::app::actions::{Action, ActionResult, apply_action, apply_outcome};

    fn screen_text(state: &State) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|frame| render(frame, state)).unwrap();
        terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect()
    }

    fn typed(state: &mut State, text: &str) -> ActionResult {
        for c in text.chars() {
            apply_action(state, Action::InputChar(c));
        }
        apply_action(state, Action::Submit)
    }

    #[test]
    fn login_screen_renders() {
        let state = State::new(Session::default(), "offline", true);
        assert!(screen_text(&state).contains("Welcome to Interaction Flow"));
    }

    #[test]
    fn graph_shows_placeholder_then_exchange() {
        let mut state = State::new(Session::default(), "offline", true);
        typed(&mut state, "ada");
        assert!(screen_text(&state).contains("Start Conversation"));

        let ActionResult::Dispatch(job) = typed(&mut state, "hello there") else {
            panic!("expected a request");
        };
        let text = screen_text(&state);
        assert!(text.contains("hello there"));
        assert!(text.contains("Generating response"));

        apply_outcome(
            &mut state,
            job.outcome(Ok(GenerationReply { remote_id: "r0".into(), response_text: "general kenobi".into() })),
        );
        let text = screen_text(&state);
        assert!(text.contains("general kenobi"));
        assert!(text.contains("Branch count: 0"));
    }
}
