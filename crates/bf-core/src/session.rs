//! Session context and the generation state machine.
//!
//! The session is owned by a single thread. Intents (`login`, `submit_*`, `reset`)
//! and completions each run to the end without yielding, so id allocation, layout,
//! insertion and history capture for one intent can never interleave with another.
//! The only asynchronous part is the remote call itself, which the caller runs
//! elsewhere with the returned [`GenerationJob`] and reports back via [`Session::complete`].

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use log::{debug, error, info, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::{ENGINE, EngineConfig, LayoutConfig, MessageConfig};
use crate::error::{SessionError, TreeError};
use crate::history::{ChatMessage, build_history};
use crate::ids::TurnId;
use crate::layout::{first_exchange_position, placeholder_position};
use crate::projection::{GraphProjection, project};
use crate::tree::ConversationTree;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Sent to the service in the user header
    pub id: String,
    pub name: String,
}

impl User {
    /// `"Ada Lovelace "` → id `ada-lovelace`, name `Ada Lovelace`.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let id = WHITESPACE.replace_all(&name.to_lowercase(), "-").into_owned();
        Some(Self { id, name: name.to_string() })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Start,
    Branch,
}

/// Which service endpoint a request goes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestTarget {
    Start,
    Branch { parent_remote_id: String },
}

impl RequestTarget {
    pub fn kind(&self) -> RequestKind {
        match self {
            RequestTarget::Start => RequestKind::Start,
            RequestTarget::Branch { .. } => RequestKind::Branch,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub user_id: String,
    pub target: RequestTarget,
    pub user_prompt: String,
    pub summary_title: Option<String>,
    /// History up to and including the parent turn; empty for a start request
    pub context_messages: Vec<ChatMessage>,
}

/// A request to run off-thread, tagged with the turn and conversation it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationJob {
    pub epoch: u64,
    pub turn_id: TurnId,
    pub request: GenerationRequest,
}

impl GenerationJob {
    pub fn outcome(&self, result: Result<GenerationReply, RemoteCallFailed>) -> GenerationOutcome {
        GenerationOutcome { epoch: self.epoch, turn_id: self.turn_id.clone(), result }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReply {
    pub remote_id: String,
    pub response_text: String,
}

/// Network error, non-success status or undecodable payload. Carries detail for the log;
/// the user sees the configured message instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCallFailed(pub String);

impl fmt::Display for RemoteCallFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Remote call failed: {}", self.0)
    }
}

impl std::error::Error for RemoteCallFailed {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub epoch: u64,
    pub turn_id: TurnId,
    pub result: Result<GenerationReply, RemoteCallFailed>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Conversation was reset after the request was issued
    StaleEpoch,
    /// Outcome for this turn was already applied
    NotInFlight,
    UnknownTurn,
}

/// What [`Session::complete`] did with an outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Settled(TurnId),
    Failed(TurnId),
    Ignored { turn_id: TurnId, reason: IgnoreReason },
    /// Tree refused the transition; a logic fault
    Rejected(TreeError),
}

#[derive(Debug, Clone)]
pub struct Session {
    user: Option<User>,
    tree: ConversationTree,
    layout: LayoutConfig,
    messages: MessageConfig,
    epoch: u64,
    in_flight: HashMap<TurnId, RequestKind>,
}

impl Session {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            user: None,
            tree: ConversationTree::new(&config.ids),
            layout: config.layout,
            messages: config.messages.clone(),
            epoch: 0,
            in_flight: HashMap::new(),
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn tree(&self) -> &ConversationTree {
        &self.tree
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn projection(&self) -> GraphProjection {
        project(self.tree.snapshot(), self.tree.revision())
    }

    /// Set the current user and start a fresh conversation.
    pub fn login(&mut self, name: &str) -> Result<&User, SessionError> {
        let user = User::from_name(name).ok_or(SessionError::EmptyName)?;
        info!("login as {} ({})", user.name, user.id);
        self.user = Some(user);
        self.reset_conversation();
        self.user.as_ref().ok_or(SessionError::NotLoggedIn)
    }

    /// Discard every turn. Completions of requests issued before this call are ignored.
    pub fn reset_conversation(&mut self) {
        if !self.in_flight.is_empty() {
            info!("reset with {} request(s) in flight", self.in_flight.len());
        }
        self.tree.reset();
        self.epoch += 1;
        self.in_flight.clear();
        if self.user.is_some() {
            self.tree.show_placeholder(placeholder_position(&self.layout));
        }
    }

    /// Turn the placeholder into the first exchange and describe its request.
    pub fn submit_initial_prompt(&mut self, text: &str) -> Result<GenerationJob, SessionError> {
        let user_id = self.user.as_ref().ok_or(SessionError::NotLoggedIn)?.id.clone();
        let prompt = non_empty(text)?;
        if self.tree.snapshot().placeholder().is_none() {
            return Err(SessionError::NoPlaceholder);
        }
        let position = first_exchange_position(&self.layout);

        let turn_id = self.tree.insert_root(prompt.clone(), position)?;
        let request = GenerationRequest {
            user_id,
            target: RequestTarget::Start,
            user_prompt: prompt,
            summary_title: None,
            context_messages: Vec::new(),
        };
        Ok(self.issue(turn_id, request))
    }

    /// Create a pending child of `parent` and describe its request.
    pub fn submit_branch(&mut self, parent: &str, text: &str) -> Result<GenerationJob, SessionError> {
        let user_id = self.user.as_ref().ok_or(SessionError::NotLoggedIn)?.id.clone();
        let prompt = non_empty(text)?;

        let parent_turn = self.tree.get(parent).ok_or_else(|| TreeError::UnknownParent(parent.into()))?;
        let parent_remote_id = parent_turn
            .remote_id()
            .ok_or_else(|| TreeError::ParentNotSettled(parent_turn.id.clone()))?
            .to_string();
        let context_messages = build_history(parent, self.tree.snapshot())?;

        let turn_id = self.tree.branch(parent, prompt.clone(), &self.layout)?;
        let request = GenerationRequest {
            user_id,
            target: RequestTarget::Branch { parent_remote_id },
            user_prompt: prompt,
            summary_title: None,
            context_messages,
        };
        Ok(self.issue(turn_id, request))
    }

    fn issue(&mut self, turn_id: TurnId, request: GenerationRequest) -> GenerationJob {
        info!("issuing {:?} request for {} (epoch {})", request.target.kind(), turn_id, self.epoch);
        self.in_flight.insert(turn_id.clone(), request.target.kind());
        GenerationJob { epoch: self.epoch, turn_id, request }
    }

    /// Apply the result of a remote call. Exactly one outcome per issued job is applied;
    /// late or duplicate outcomes are reported as `Ignored`.
    pub fn complete(&mut self, outcome: GenerationOutcome) -> Completion {
        let GenerationOutcome { epoch, turn_id, result } = outcome;

        if epoch != self.epoch {
            debug!("dropping outcome for {} from epoch {} (now {})", turn_id, epoch, self.epoch);
            return Completion::Ignored { turn_id, reason: IgnoreReason::StaleEpoch };
        }
        let Some(kind) = self.in_flight.remove(&turn_id) else {
            warn!("outcome for {} but no request in flight", turn_id);
            return Completion::Ignored { turn_id, reason: IgnoreReason::NotInFlight };
        };

        let result = result.and_then(|reply| {
            if reply.remote_id.is_empty() {
                Err(RemoteCallFailed("reply has an empty node id".into()))
            } else {
                Ok(reply)
            }
        });

        let applied = match result {
            Ok(reply) => self
                .tree
                .settle(turn_id.as_str(), reply.response_text, reply.remote_id)
                .map(|_| Completion::Settled(turn_id.clone())),
            Err(failure) => {
                warn!("generation for {} failed: {}", turn_id, failure);
                let message = match kind {
                    RequestKind::Start => self.messages.start_failed.clone(),
                    RequestKind::Branch => self.messages.branch_failed.clone(),
                };
                self.tree.fail(turn_id.as_str(), message).map(|_| Completion::Failed(turn_id.clone()))
            }
        };

        match applied {
            Ok(completion) => completion,
            Err(TreeError::UnknownTurn(_)) => Completion::Ignored { turn_id, reason: IgnoreReason::UnknownTurn },
            Err(e) => {
                error!("could not apply outcome for {}: {}", turn_id, e);
                Completion::Rejected(e)
            }
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(&ENGINE)
    }
}

fn non_empty(text: &str) -> Result<String, SessionError> {
    let trimmed = text.trim();
    if trimmed.is_empty() { Err(SessionError::EmptyPrompt) } else { Ok(trimmed.to_string()) }
}
