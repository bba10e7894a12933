//! Conversation-tree engine: identities, layout, history, mutation and projection.
//!
//! No I/O happens here. The binary drives a [`Session`] from its event loop and runs
//! the remote calls described by [`GenerationJob`]s on worker threads.

pub mod config;
pub mod error;
pub mod history;
pub mod ids;
pub mod layout;
pub mod projection;
pub mod session;
pub mod tree;
pub mod turn;

pub use error::{SessionError, TreeError};
pub use history::{ChatMessage, Role, build_history};
pub use ids::{IdAllocator, TurnId};
pub use layout::Position;
pub use projection::{DisplayPayload, EdgeView, ExchangeBody, GraphProjection, NodeView};
pub use session::{
    Completion, GenerationJob, GenerationOutcome, GenerationReply, GenerationRequest, IgnoreReason, RemoteCallFailed,
    RequestKind, RequestTarget, Session, User,
};
pub use tree::{ConversationTree, Snapshot};
pub use turn::{Edge, PLACEHOLDER_ID, Settlement, Turn, TurnKind, TurnStatus};
