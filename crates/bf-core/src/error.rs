use std::fmt;

use crate::ids::TurnId;

/// Structural errors raised by the tree mutator and the history walk.
///
/// Apart from `UnknownTurn` on a late completion, these indicate a logic fault in the
/// caller rather than a condition to show the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Branch requested from a turn that is not in the snapshot
    UnknownParent(TurnId),
    /// Branch requested from a turn with no remote id yet
    ParentNotSettled(TurnId),
    /// Settle/fail/history for a turn that is not in the snapshot
    UnknownTurn(TurnId),
    AlreadySettled(TurnId),
    AlreadyFailed(TurnId),
    /// A second root was requested while one already exists
    RootAlreadyExists(TurnId),
    /// Cycle or dangling parent reference found while walking ancestors
    MalformedTree { at: TurnId, reason: String },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::UnknownParent(id) => write!(f, "Unknown parent turn: {}", id),
            TreeError::ParentNotSettled(id) => write!(f, "Parent turn {} has not settled yet", id),
            TreeError::UnknownTurn(id) => write!(f, "Unknown turn: {}", id),
            TreeError::AlreadySettled(id) => write!(f, "Turn {} is already settled", id),
            TreeError::AlreadyFailed(id) => write!(f, "Turn {} has already failed", id),
            TreeError::RootAlreadyExists(id) => write!(f, "Conversation already has root {}", id),
            TreeError::MalformedTree { at, reason } => write!(f, "Malformed tree at {}: {}", at, reason),
        }
    }
}

impl std::error::Error for TreeError {}

/// Errors returned by user intents on a [`Session`](crate::session::Session).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    NotLoggedIn,
    /// Blank login name
    EmptyName,
    /// Blank prompt
    EmptyPrompt,
    /// Initial prompt submitted when no "start conversation" placeholder is showing
    NoPlaceholder,
    Tree(TreeError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NotLoggedIn => write!(f, "No user is logged in"),
            SessionError::EmptyName => write!(f, "Name must not be empty"),
            SessionError::EmptyPrompt => write!(f, "Prompt must not be empty"),
            SessionError::NoPlaceholder => write!(f, "Conversation has already started"),
            SessionError::Tree(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Tree(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TreeError> for SessionError {
    fn from(e: TreeError) -> Self {
        SessionError::Tree(e)
    }
}
