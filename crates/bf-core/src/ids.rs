use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::IdConfig;

/// Local identity of a turn in the graph.
///
/// Assigned once by [`IdAllocator`] and never changed, even after the remote
/// service hands back its own identifier for the same turn.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnId(String);

impl TurnId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for TurnId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TurnId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for TurnId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for TurnId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Hands out `t0`, `t1`, ... for the lifetime of one conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    prefix: String,
    start: u64,
    next: u64,
}

impl IdAllocator {
    pub fn new(config: &IdConfig) -> Self {
        Self { prefix: config.prefix.clone(), start: config.start, next: config.start }
    }

    /// Allocate the next id. Strictly increasing until [`reset`](Self::reset).
    pub fn next(&mut self) -> TurnId {
        let n = self.next;
        self.next += 1;
        TurnId(format!("{}{}", self.prefix, n))
    }

    pub fn reset(&mut self) {
        self.next = self.start;
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new(&IdConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn starts_at_t0() {
        let mut ids = IdAllocator::default();
        assert_eq!(ids.next(), "t0");
        assert_eq!(ids.next(), "t1");
    }

    #[test]
    fn back_to_back_allocations_are_distinct() {
        let mut ids = IdAllocator::default();
        let all: HashSet<TurnId> = (0..100).map(|_| ids.next()).collect();
        assert_eq!(all.len(), 100);
        assert_eq!(ids.next(), "t100");
    }

    #[test]
    fn reset_restarts_sequence() {
        let mut ids = IdAllocator::default();
        ids.next();
        ids.next();
        ids.reset();
        assert_eq!(ids.next(), "t0");
    }

    #[test]
    fn custom_prefix_and_start() {
        let mut ids = IdAllocator::new(&IdConfig { prefix: "turn-".into(), start: 7 });
        assert_eq!(ids.next(), "turn-7");
        ids.reset();
        assert_eq!(ids.next(), "turn-7");
    }
}
