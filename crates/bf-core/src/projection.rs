//! Read-only view of the tree handed to the renderer.

use serde::Serialize;

use crate::ids::TurnId;
use crate::layout::Position;
use crate::tree::Snapshot;
use crate::turn::{Settlement, Turn, TurnKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ExchangeBody {
    Loading,
    Response { text: String },
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DisplayPayload {
    Placeholder,
    Exchange {
        prompt: String,
        body: ExchangeBody,
        branch_count: usize,
        /// Only settled exchanges accept a branch prompt
        can_branch: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    pub id: TurnId,
    pub kind: TurnKind,
    pub position: Position,
    pub display: DisplayPayload,
}

impl NodeView {
    /// Whether the node shows an input box.
    pub fn accepts_input(&self) -> bool {
        match &self.display {
            DisplayPayload::Placeholder => true,
            DisplayPayload::Exchange { can_branch, .. } => *can_branch,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeView {
    pub id: String,
    pub source: TurnId,
    pub target: TurnId,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphProjection {
    /// Tree revision this projection was built from
    pub revision: u64,
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
}

impl GraphProjection {
    pub fn node(&self, id: &str) -> Option<&NodeView> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

fn node_view(turn: &Turn) -> NodeView {
    let display = match turn.kind {
        TurnKind::RootPrompt => DisplayPayload::Placeholder,
        TurnKind::Exchange => {
            let body = match &turn.settlement {
                Settlement::Pending => ExchangeBody::Loading,
                Settlement::Settled { response_text, .. } => ExchangeBody::Response { text: response_text.clone() },
                Settlement::Failed { message } => ExchangeBody::Error { message: message.clone() },
            };
            DisplayPayload::Exchange {
                prompt: turn.prompt.clone(),
                body,
                branch_count: turn.branch_count,
                can_branch: turn.remote_id().is_some(),
            }
        }
    };
    NodeView { id: turn.id.clone(), kind: turn.kind, position: turn.position, display }
}

/// Nodes in creation order (placeholder first when present), then edges in creation order.
pub fn project(snapshot: &Snapshot, revision: u64) -> GraphProjection {
    let nodes = snapshot.placeholder().into_iter().chain(snapshot.turns()).map(node_view).collect();
    let edges = snapshot
        .edges()
        .iter()
        .map(|e| EdgeView { id: e.id.clone(), source: e.source.clone(), target: e.target.clone() })
        .collect();
    GraphProjection { revision, nodes, edges }
}
