//! Canonical conversation tree and the only code that mutates it.
//!
//! Turns live in an arena (`Vec<Turn>`) with an id → slot index; parents are referenced
//! by id and resolved through the index, so the snapshot is plain data that can be
//! cloned and compared in tests.
//!
//! Every mutating call validates first and commits second. A call that returns `Err`
//! has not touched the snapshot, the allocator or the revision counter.

use std::collections::HashMap;

use log::debug;

use crate::config::{IdConfig, LayoutConfig};
use crate::error::TreeError;
use crate::ids::{IdAllocator, TurnId};
use crate::layout::{self, Position};
use crate::turn::{Edge, Settlement, Turn, TurnStatus};

/// All turns and edges at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    turns: Vec<Turn>,
    index: HashMap<TurnId, usize>,
    edges: Vec<Edge>,
    placeholder: Option<Turn>,
}

impl Snapshot {
    pub fn get(&self, id: &str) -> Option<&Turn> {
        self.index.get(id).map(|&slot| &self.turns[slot])
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Turn> {
        self.index.get(id).map(|&slot| &mut self.turns[slot])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Turns in creation order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Edges in creation order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn placeholder(&self) -> Option<&Turn> {
        self.placeholder.as_ref()
    }

    pub fn root(&self) -> Option<&Turn> {
        self.turns.iter().find(|t| t.parent_id.is_none())
    }

    pub fn children_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Turn> + 'a {
        self.turns.iter().filter(move |t| t.parent_id.as_ref().is_some_and(|p| p == id))
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Check every structural invariant. Used by tests and debug builds.
    pub fn validate(&self) -> Result<(), TreeError> {
        let malformed = |at: &TurnId, reason: String| TreeError::MalformedTree { at: at.clone(), reason };

        if self.index.len() != self.turns.len() {
            let at = self.turns.first().map(|t| t.id.clone()).unwrap_or_else(|| TurnId::new("?"));
            return Err(malformed(&at, "duplicate turn id".into()));
        }

        let roots: Vec<&Turn> = self.turns.iter().filter(|t| t.parent_id.is_none()).collect();
        if !self.turns.is_empty() && roots.len() != 1 {
            return Err(malformed(&self.turns[0].id, format!("expected one root, found {}", roots.len())));
        }

        for turn in &self.turns {
            let children = self.children_of(turn.id.as_str()).count();
            if children != turn.branch_count {
                return Err(malformed(
                    &turn.id,
                    format!("branch_count {} but {} children", turn.branch_count, children),
                ));
            }
            if let Some(parent) = &turn.parent_id {
                if !self.contains(parent.as_str()) {
                    return Err(malformed(&turn.id, format!("missing parent {}", parent)));
                }
                if !self.edges.iter().any(|e| &e.source == parent && e.target == turn.id) {
                    return Err(malformed(&turn.id, "no incoming edge".into()));
                }
            }
            let mut cursor = turn.parent_id.as_ref();
            let mut steps = 0;
            while let Some(p) = cursor {
                steps += 1;
                if steps > self.turns.len() {
                    return Err(malformed(&turn.id, "parent cycle".into()));
                }
                cursor = self.get(p.as_str()).and_then(|t| t.parent_id.as_ref());
            }
        }

        for edge in &self.edges {
            if !self.contains(edge.source.as_str()) || !self.contains(edge.target.as_str()) {
                return Err(malformed(&edge.target, format!("dangling edge {}", edge.id)));
            }
        }

        Ok(())
    }

    fn push(&mut self, turn: Turn, edge: Option<Edge>) {
        self.index.insert(turn.id.clone(), self.turns.len());
        self.turns.push(turn);
        if let Some(edge) = edge {
            self.edges.push(edge);
        }
    }

    #[cfg(test)]
    pub(crate) fn from_parts(turns: Vec<Turn>, edges: Vec<Edge>) -> Self {
        let index = turns.iter().enumerate().map(|(slot, t)| (t.id.clone(), slot)).collect();
        Self { turns, index, edges, placeholder: None }
    }
}

/// Owner of the snapshot and the id sequence.
#[derive(Debug, Clone)]
pub struct ConversationTree {
    snapshot: Snapshot,
    ids: IdAllocator,
    revision: u64,
}

impl ConversationTree {
    pub fn new(ids: &IdConfig) -> Self {
        Self { snapshot: Snapshot::default(), ids: IdAllocator::new(ids), revision: 0 }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Bumped by every successful mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn get(&self, id: &str) -> Option<&Turn> {
        self.snapshot.get(id)
    }

    /// Show the "start conversation" input. Ignored once the tree has a root.
    pub fn show_placeholder(&mut self, position: Position) {
        if !self.snapshot.is_empty() {
            return;
        }
        self.snapshot.placeholder = Some(Turn::placeholder(position));
        self.touch();
    }

    /// Create the first exchange in `Pending`. Replaces the placeholder.
    pub fn insert_root(&mut self, prompt: impl Into<String>, position: Position) -> Result<TurnId, TreeError> {
        if let Some(root) = self.snapshot.root() {
            return Err(TreeError::RootAlreadyExists(root.id.clone()));
        }

        let id = self.ids.next();
        self.snapshot.placeholder = None;
        self.snapshot.push(Turn::pending(id.clone(), prompt.into(), None, position), None);
        self.touch();
        debug!("inserted root {} at ({}, {})", id, position.x, position.y);
        Ok(id)
    }

    /// Create a `Pending` child of `parent` at `position`, bump the parent's branch
    /// count and add the connecting edge.
    pub fn insert_branch(
        &mut self,
        parent: &str,
        prompt: impl Into<String>,
        position: Position,
    ) -> Result<TurnId, TreeError> {
        let parent_turn = self.snapshot.get(parent).ok_or_else(|| TreeError::UnknownParent(parent.into()))?;
        if parent_turn.remote_id().is_none() {
            return Err(TreeError::ParentNotSettled(parent_turn.id.clone()));
        }
        let parent_id = parent_turn.id.clone();

        let id = self.ids.next();
        let edge = Edge::new(parent_id.clone(), id.clone());
        if let Some(p) = self.snapshot.get_mut(parent) {
            p.branch_count += 1;
        }
        self.snapshot.push(Turn::pending(id.clone(), prompt.into(), Some(parent_id), position), Some(edge));
        self.touch();
        debug!("inserted branch {} under {} at ({}, {})", id, parent, position.x, position.y);
        Ok(id)
    }

    /// Read the parent's current branch count, place the child and insert it, as one
    /// call so no other insertion can observe the same count.
    pub fn branch(
        &mut self,
        parent: &str,
        prompt: impl Into<String>,
        layout: &LayoutConfig,
    ) -> Result<TurnId, TreeError> {
        let parent_turn = self.snapshot.get(parent).ok_or_else(|| TreeError::UnknownParent(parent.into()))?;
        let position = layout::place(parent_turn.position, parent_turn.branch_count, layout);
        self.insert_branch(parent, prompt, position)
    }

    pub fn settle(
        &mut self,
        id: &str,
        response_text: impl Into<String>,
        remote_id: impl Into<String>,
    ) -> Result<(), TreeError> {
        let turn = self.pending_turn_mut(id)?;
        turn.settlement = Settlement::Settled { response_text: response_text.into(), remote_id: remote_id.into() };
        self.touch();
        debug!("settled {}", id);
        Ok(())
    }

    pub fn fail(&mut self, id: &str, message: impl Into<String>) -> Result<(), TreeError> {
        let turn = self.pending_turn_mut(id)?;
        turn.settlement = Settlement::Failed { message: message.into() };
        self.touch();
        debug!("failed {}", id);
        Ok(())
    }

    /// Drop every turn and edge and restart the id sequence.
    pub fn reset(&mut self) {
        self.snapshot = Snapshot::default();
        self.ids.reset();
        self.touch();
    }

    fn pending_turn_mut(&mut self, id: &str) -> Result<&mut Turn, TreeError> {
        let turn = self.snapshot.get_mut(id).ok_or_else(|| TreeError::UnknownTurn(id.into()))?;
        match turn.status() {
            TurnStatus::Pending => Ok(turn),
            TurnStatus::Settled => Err(TreeError::AlreadySettled(turn.id.clone())),
            TurnStatus::Failed => Err(TreeError::AlreadyFailed(turn.id.clone())),
        }
    }

    fn touch(&mut self) {
        self.revision += 1;
        debug_assert!(self.snapshot.validate().is_ok(), "{:?}", self.snapshot.validate());
    }
}

impl Default for ConversationTree {
    fn default() -> Self {
        Self::new(&IdConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::turn::TurnKind;

    fn layout() -> LayoutConfig {
        LayoutConfig {
            branch_spacing: 350.0,
            vertical_offset: 200.0,
            placeholder_x: 0.0,
            placeholder_y: 100.0,
            first_exchange_offset: 150.0,
        }
    }

    fn settled_root(tree: &mut ConversationTree) -> TurnId {
        let root = tree.insert_root("hi", Position::new(0.0, 250.0)).unwrap();
        tree.settle(root.as_str(), "hello", "r0").unwrap();
        root
    }

    #[test]
    fn insert_root_replaces_placeholder() {
        let mut tree = ConversationTree::default();
        tree.show_placeholder(Position::new(0.0, 100.0));
        assert_eq!(tree.snapshot().placeholder().map(|p| p.kind), Some(TurnKind::RootPrompt));

        let root = tree.insert_root("hi", Position::new(0.0, 250.0)).unwrap();
        assert_eq!(root, "t0");
        assert!(tree.snapshot().placeholder().is_none());
        assert!(tree.snapshot().edges().is_empty());
        assert_eq!(tree.get("t0").unwrap().status(), TurnStatus::Pending);
    }

    #[test]
    fn placeholder_ignored_once_rooted() {
        let mut tree = ConversationTree::default();
        settled_root(&mut tree);
        tree.show_placeholder(Position::default());
        assert!(tree.snapshot().placeholder().is_none());
    }

    #[test]
    fn second_root_rejected() {
        let mut tree = ConversationTree::default();
        settled_root(&mut tree);
        let before = tree.snapshot().clone();
        assert_eq!(tree.insert_root("again", Position::default()), Err(TreeError::RootAlreadyExists("t0".into())));
        assert_eq!(tree.snapshot(), &before);
    }

    #[test]
    fn insert_branch_links_and_counts() {
        let mut tree = ConversationTree::default();
        let root = settled_root(&mut tree);
        let child = tree.insert_branch(root.as_str(), "more", Position::new(0.0, 450.0)).unwrap();

        let snap = tree.snapshot();
        assert_eq!(snap.get(root.as_str()).unwrap().branch_count, 1);
        assert_eq!(snap.get(child.as_str()).unwrap().parent_id.as_ref(), Some(&root));
        assert_eq!(snap.edges(), &[Edge::new(root.clone(), child.clone())]);
        assert!(snap.validate().is_ok());
    }

    #[test]
    fn unknown_parent_changes_nothing() {
        let mut tree = ConversationTree::default();
        settled_root(&mut tree);
        let before = tree.snapshot().clone();
        let rev = tree.revision();

        assert_eq!(tree.insert_branch("t42", "x", Position::default()), Err(TreeError::UnknownParent("t42".into())));
        assert_eq!(tree.snapshot(), &before);
        assert_eq!(tree.revision(), rev);
    }

    #[test]
    fn branch_from_pending_parent_rejected() {
        let mut tree = ConversationTree::default();
        tree.insert_root("hi", Position::default()).unwrap();
        let before = tree.snapshot().clone();

        assert_eq!(tree.insert_branch("t0", "x", Position::default()), Err(TreeError::ParentNotSettled("t0".into())));
        assert_eq!(tree.snapshot(), &before);
        // The failed attempt must not burn an id.
        let root_child_attempt = tree.settle("t0", "a", "r0").and_then(|_| tree.insert_branch("t0", "x", Position::default()));
        assert_eq!(root_child_attempt, Ok(TurnId::new("t1")));
    }

    #[test]
    fn branch_from_failed_parent_rejected() {
        let mut tree = ConversationTree::default();
        tree.insert_root("hi", Position::default()).unwrap();
        tree.fail("t0", "nope").unwrap();
        assert_eq!(tree.insert_branch("t0", "x", Position::default()), Err(TreeError::ParentNotSettled("t0".into())));
    }

    #[test]
    fn settle_twice_keeps_first_response() {
        let mut tree = ConversationTree::default();
        let root = settled_root(&mut tree);
        assert_eq!(tree.settle(root.as_str(), "second", "r9"), Err(TreeError::AlreadySettled(root.clone())));
        let t = tree.get(root.as_str()).unwrap();
        assert_eq!(t.response_text(), Some("hello"));
        assert_eq!(t.remote_id(), Some("r0"));
    }

    #[test]
    fn fail_after_fail_and_settle_after_fail() {
        let mut tree = ConversationTree::default();
        tree.insert_root("hi", Position::default()).unwrap();
        tree.fail("t0", "down").unwrap();
        assert_eq!(tree.fail("t0", "again"), Err(TreeError::AlreadyFailed("t0".into())));
        assert_eq!(tree.settle("t0", "late", "r0"), Err(TreeError::AlreadyFailed("t0".into())));
        assert_eq!(tree.get("t0").unwrap().error_message(), Some("down"));
    }

    #[test]
    fn fail_on_settled_rejected() {
        let mut tree = ConversationTree::default();
        settled_root(&mut tree);
        assert_eq!(tree.fail("t0", "x"), Err(TreeError::AlreadySettled("t0".into())));
    }

    #[test]
    fn settle_unknown_turn() {
        let mut tree = ConversationTree::default();
        assert_eq!(tree.settle("t5", "a", "b"), Err(TreeError::UnknownTurn("t5".into())));
    }

    #[test]
    fn reset_clears_and_restarts_ids() {
        let mut tree = ConversationTree::default();
        let root = settled_root(&mut tree);
        tree.insert_branch(root.as_str(), "x", Position::default()).unwrap();
        tree.reset();

        assert!(tree.snapshot().is_empty());
        assert!(tree.snapshot().edges().is_empty());
        assert_eq!(tree.insert_root("again", Position::default()).unwrap(), "t0");
    }

    #[test]
    fn branch_uses_current_count_each_time() {
        let mut tree = ConversationTree::default();
        let root = settled_root(&mut tree);
        let a = tree.branch(root.as_str(), "a", &layout()).unwrap();
        let b = tree.branch(root.as_str(), "b", &layout()).unwrap();

        let pa = tree.get(a.as_str()).unwrap().position;
        let pb = tree.get(b.as_str()).unwrap().position;
        assert_ne!(pa, pb);
        assert_eq!(pa.y, pb.y);
        assert_eq!(tree.get(root.as_str()).unwrap().branch_count, 2);
    }

    #[test]
    fn validate_detects_dangling_edge() {
        let root = Turn::pending("t0".into(), "hi".into(), None, Position::default());
        let snap = Snapshot::from_parts(vec![root], vec![Edge::new("t0".into(), "t9".into())]);
        assert!(matches!(snap.validate(), Err(TreeError::MalformedTree { .. })));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Branch(usize),
        Settle(usize),
        Fail(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..32).prop_map(Op::Branch),
            (0usize..32).prop_map(Op::Settle),
            (0usize..32).prop_map(Op::Fail),
        ]
    }

    proptest! {
        #[test]
        fn branch_count_matches_outgoing_edges(ops in prop::collection::vec(op(), 0..64)) {
            let mut tree = ConversationTree::default();
            tree.insert_root("root", Position::default()).unwrap();
            tree.settle("t0", "ok", "r0").unwrap();

            for op in ops {
                let ids: Vec<TurnId> = tree.snapshot().turns().iter().map(|t| t.id.clone()).collect();
                let pick = |n: usize| ids[n % ids.len()].clone();
                let _ = match op {
                    Op::Branch(n) => tree.branch(pick(n).as_str(), "p", &layout()).map(|_| ()),
                    Op::Settle(n) => {
                        let id = pick(n);
                        tree.settle(id.as_str(), "r", format!("remote-{}", id))
                    }
                    Op::Fail(n) => tree.fail(pick(n).as_str(), "err"),
                };
            }

            let snap = tree.snapshot();
            for turn in snap.turns() {
                let out = snap.edges().iter().filter(|e| e.source == turn.id).count();
                prop_assert_eq!(turn.branch_count, out);
            }
            prop_assert!(snap.validate().is_ok());
        }
    }
}
