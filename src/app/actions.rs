use bf_core::{Completion, DisplayPayload, GenerationJob, GenerationOutcome, PLACEHOLDER_ID};
use log::{debug, error, info};

use super::state::{Screen, State};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    InputChar(char),
    InputBackspace,
    InputDelete,
    CursorLeft,
    CursorRight,
    CursorHome,
    CursorEnd,
    PasteText(String),
    Submit,
    SelectNext,
    SelectPrev,
    Pan { dx: f64, dy: f64 },
    NewConversation,
    Redraw,
    None,
}

#[derive(Debug)]
pub enum ActionResult {
    Nothing,
    /// A request was issued; run it on a worker
    Dispatch(GenerationJob),
}

pub fn apply_action(state: &mut State, action: Action) -> ActionResult {
    state.dirty = true;
    match action {
        Action::InputChar(c) => {
            state.input.insert(state.input_cursor, c);
            state.input_cursor += c.len_utf8();
        }
        Action::InputBackspace => {
            if let Some(prev) = state.input[..state.input_cursor].chars().next_back() {
                state.input_cursor -= prev.len_utf8();
                state.input.remove(state.input_cursor);
            }
        }
        Action::InputDelete => {
            if state.input_cursor < state.input.len() {
                state.input.remove(state.input_cursor);
            }
        }
        Action::CursorLeft => {
            if let Some(prev) = state.input[..state.input_cursor].chars().next_back() {
                state.input_cursor -= prev.len_utf8();
            }
        }
        Action::CursorRight => {
            if let Some(next) = state.input[state.input_cursor..].chars().next() {
                state.input_cursor += next.len_utf8();
            }
        }
        Action::CursorHome => state.input_cursor = 0,
        Action::CursorEnd => state.input_cursor = state.input.len(),
        Action::PasteText(text) => {
            // Single-line input
            let flat = text.replace('\n', " ");
            state.input.insert_str(state.input_cursor, &flat);
            state.input_cursor += flat.len();
        }
        Action::Submit => return submit(state),
        Action::SelectNext => state.cycle_selection(1),
        Action::SelectPrev => state.cycle_selection(-1),
        Action::Pan { dx, dy } => state.viewport = state.viewport.offset(dx, dy),
        Action::NewConversation => {
            if state.screen == Screen::Graph {
                info!("new conversation requested");
                state.session.reset_conversation();
                state.last_error = None;
                state.selected = None;
                state.refresh();
            }
        }
        Action::Redraw => {}
        Action::None => state.dirty = false,
    }
    ActionResult::Nothing
}

fn submit(state: &mut State) -> ActionResult {
    if state.screen == Screen::Login {
        match state.session.login(&state.input) {
            Ok(_) => {
                state.screen = Screen::Graph;
                state.last_error = None;
                state.selected = None;
                state.clear_input();
                state.refresh();
            }
            Err(e) => state.last_error = Some(e.to_string()),
        }
        return ActionResult::Nothing;
    }

    let target = state.selected_node().map(|n| (n.id.clone(), matches!(n.display, DisplayPayload::Placeholder)));
    let Some((id, is_placeholder)) = target else {
        state.last_error = Some("No node selected".to_string());
        return ActionResult::Nothing;
    };
    let issued = if is_placeholder {
        state.session.submit_initial_prompt(&state.input)
    } else {
        state.session.submit_branch(id.as_str(), &state.input)
    };

    match issued {
        Ok(job) => {
            state.last_error = None;
            state.clear_input();
            state.refresh();
            ActionResult::Dispatch(job)
        }
        Err(e) => {
            state.last_error = Some(e.to_string());
            ActionResult::Nothing
        }
    }
}

/// Hand a worker's outcome to the session and surface failures in the status bar.
pub fn apply_outcome(state: &mut State, outcome: GenerationOutcome) -> Completion {
    let completion = state.session.complete(outcome);
    match &completion {
        Completion::Settled(id) => debug!("{} settled", id),
        Completion::Failed(id) => {
            state.last_error = state.session.tree().get(id.as_str()).and_then(|t| t.error_message()).map(str::to_string);
        }
        Completion::Ignored { turn_id, reason } => debug!("outcome for {} ignored: {:?}", turn_id, reason),
        Completion::Rejected(e) => {
            error!("outcome rejected: {}", e);
            state.last_error = Some(e.to_string());
        }
    }
    if !matches!(completion, Completion::Ignored { .. }) {
        state.refresh();
    }
    completion
}

/// The node the input line is aimed at, for the input title.
pub fn input_target(state: &State) -> Option<String> {
    let node = state.selected_node()?;
    if node.id == PLACEHOLDER_ID {
        return Some("new conversation".to_string());
    }
    Some(format!("branch from {}", node.id))
}
