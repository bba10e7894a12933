use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::TreeError;
use crate::tree::Snapshot;
use crate::turn::{Turn, TurnKind, TurnStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of the linear history sent to the generation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Ordered root → `node_id` message sequence.
///
/// Every exchange contributes its prompt; only settled exchanges contribute their
/// response. Fails with `MalformedTree` on a parent cycle or a missing ancestor.
pub fn build_history(node_id: &str, snapshot: &Snapshot) -> Result<Vec<ChatMessage>, TreeError> {
    let start = snapshot.get(node_id).ok_or_else(|| TreeError::UnknownTurn(node_id.into()))?;

    let mut chain: Vec<&Turn> = vec![start];
    let mut seen: HashSet<&str> = HashSet::from([start.id.as_str()]);
    let mut cursor = start;

    while let Some(parent_id) = &cursor.parent_id {
        let parent = snapshot.get(parent_id.as_str()).ok_or_else(|| TreeError::MalformedTree {
            at: cursor.id.clone(),
            reason: format!("missing ancestor {}", parent_id),
        })?;
        if !seen.insert(parent.id.as_str()) {
            return Err(TreeError::MalformedTree { at: parent.id.clone(), reason: "parent cycle".into() });
        }
        chain.push(parent);
        cursor = parent;
    }

    let mut out = Vec::with_capacity(chain.len() * 2);
    for turn in chain.into_iter().rev() {
        if turn.kind == TurnKind::RootPrompt {
            continue;
        }
        out.push(ChatMessage::user(turn.prompt.clone()));
        if turn.status() == TurnStatus::Settled
            && let Some(text) = turn.response_text()
        {
            out.push(ChatMessage::assistant(text));
        }
    }
    Ok(out)
}
