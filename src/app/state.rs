use bf_core::{GraphProjection, NodeView, Position, Session, TurnId};

use crate::constants::{EXCHANGE_HEIGHT, UNITS_PER_ROW};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Graph,
}

/// Everything the renderer reads. Owned by the event-loop thread.
pub struct State {
    pub session: Session,
    pub screen: Screen,
    pub input: String,
    /// Byte offset into `input`
    pub input_cursor: usize,
    /// Node the input line is aimed at
    pub selected: Option<TurnId>,
    /// Graph coordinates shown at the centre of the canvas
    pub viewport: Position,
    pub last_error: Option<String>,
    /// Label of the generation backend
    pub backend: &'static str,
    pub offline: bool,
    pub spinner_frame: u64,
    pub dirty: bool,
    projection: GraphProjection,
}

impl State {
    pub fn new(session: Session, backend: &'static str, offline: bool) -> Self {
        let projection = session.projection();
        Self {
            session,
            screen: Screen::Login,
            input: String::new(),
            input_cursor: 0,
            selected: None,
            viewport: Position::default(),
            last_error: None,
            backend,
            offline,
            spinner_frame: 0,
            dirty: true,
            projection,
        }
    }

    pub fn projection(&self) -> &GraphProjection {
        &self.projection
    }

    pub fn selected_node(&self) -> Option<&NodeView> {
        self.selected.as_ref().and_then(|id| self.projection.node(id.as_str()))
    }

    /// Rebuild the projection after a session mutation and keep the selection on a node
    /// that still accepts input.
    pub fn refresh(&mut self) {
        self.projection = self.session.projection();
        if !self.selected_node().is_some_and(NodeView::accepts_input) {
            let next = self.projection.nodes.iter().rev().find(|n| n.accepts_input()).map(|n| n.id.clone());
            self.selected = next;
            if let Some(id) = self.selected.clone() {
                self.focus(&id);
            }
        }
        self.dirty = true;
    }

    /// Ids of nodes that accept input, in projection order.
    pub fn selectable(&self) -> Vec<TurnId> {
        self.projection.nodes.iter().filter(|n| n.accepts_input()).map(|n| n.id.clone()).collect()
    }

    /// Move the selection `step` places through the selectable nodes, wrapping around.
    pub fn cycle_selection(&mut self, step: isize) {
        let ids = self.selectable();
        if ids.is_empty() {
            self.selected = None;
            return;
        }
        let len = ids.len() as isize;
        let next = match self.selected.as_ref().and_then(|s| ids.iter().position(|id| id == s)) {
            Some(i) => (i as isize + step).rem_euclid(len),
            None if step < 0 => len - 1,
            None => 0,
        };
        let id = ids[next as usize].clone();
        self.focus(&id);
        self.selected = Some(id);
    }

    /// Centre the viewport on a node.
    pub fn focus(&mut self, id: &TurnId) {
        if let Some(node) = self.projection.node(id.as_str()) {
            let half_height = f64::from(EXCHANGE_HEIGHT) * UNITS_PER_ROW / 2.0;
            self.viewport = node.position.offset(0.0, half_height);
        }
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
        self.input_cursor = 0;
    }
}
