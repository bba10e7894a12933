use serde::{Deserialize, Serialize};

use crate::ids::TurnId;
use crate::layout::Position;

/// Id used for the "start conversation" placeholder. Never produced by the allocator.
pub const PLACEHOLDER_ID: &str = "root-prompt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TurnKind {
    /// Input box shown before any exchange exists. Not part of the tree.
    RootPrompt,
    /// Prompt plus (eventual) response
    Exchange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    Pending,
    Settled,
    Failed,
}

/// Lifecycle of an exchange. Leaves `Pending` exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Settlement {
    Pending,
    Settled { response_text: String, remote_id: String },
    Failed { message: String },
}

impl Settlement {
    pub fn status(&self) -> TurnStatus {
        match self {
            Settlement::Pending => TurnStatus::Pending,
            Settlement::Settled { .. } => TurnStatus::Settled,
            Settlement::Failed { .. } => TurnStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub id: TurnId,
    pub kind: TurnKind,
    pub prompt: String,
    pub settlement: Settlement,
    /// `None` for the tree root (and the placeholder)
    pub parent_id: Option<TurnId>,
    /// Children created from this turn so far
    pub branch_count: usize,
    /// Assigned at creation, never moved
    pub position: Position,
}

impl Turn {
    pub fn placeholder(position: Position) -> Self {
        Self {
            id: TurnId::new(PLACEHOLDER_ID),
            kind: TurnKind::RootPrompt,
            prompt: String::new(),
            settlement: Settlement::Pending,
            parent_id: None,
            branch_count: 0,
            position,
        }
    }

    /// A new exchange awaiting its response.
    pub fn pending(id: TurnId, prompt: String, parent_id: Option<TurnId>, position: Position) -> Self {
        Self {
            id,
            kind: TurnKind::Exchange,
            prompt,
            settlement: Settlement::Pending,
            parent_id,
            branch_count: 0,
            position,
        }
    }

    pub fn status(&self) -> TurnStatus {
        self.settlement.status()
    }

    pub fn response_text(&self) -> Option<&str> {
        match &self.settlement {
            Settlement::Settled { response_text, .. } => Some(response_text),
            _ => None,
        }
    }

    /// Server-side id, required to branch from this turn.
    pub fn remote_id(&self) -> Option<&str> {
        match &self.settlement {
            Settlement::Settled { remote_id, .. } => Some(remote_id),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.settlement {
            Settlement::Failed { message } => Some(message),
            _ => None,
        }
    }
}

/// Directed parent → child link. Created with the child, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: TurnId,
    pub target: TurnId,
}

impl Edge {
    pub fn new(source: TurnId, target: TurnId) -> Self {
        Self { id: format!("e-{}-{}", source, target), source, target }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_turn_has_no_response() {
        let t = Turn::pending("t0".into(), "hi".into(), None, Position::default());
        assert_eq!(t.status(), TurnStatus::Pending);
        assert!(t.response_text().is_none());
        assert!(t.remote_id().is_none());
    }

    #[test]
    fn settled_accessors() {
        let mut t = Turn::pending("t0".into(), "hi".into(), None, Position::default());
        t.settlement = Settlement::Settled { response_text: "hello".into(), remote_id: "r0".into() };
        assert_eq!(t.response_text(), Some("hello"));
        assert_eq!(t.remote_id(), Some("r0"));
        assert!(t.error_message().is_none());
    }

    #[test]
    fn edge_id_format() {
        let e = Edge::new("t0".into(), "t1".into());
        assert_eq!(e.id, "e-t0-t1");
    }

    #[test]
    fn settlement_serializes_tagged() {
        let s = Settlement::Failed { message: "boom".into() };
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, r#"{"status":"failed","message":"boom"}"#);
    }
}
