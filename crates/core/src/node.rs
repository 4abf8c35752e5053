//! Node identity.
//!
//! Syntactically identical sub-trees (the two `2`s in `2 + abs(2)`) must stay
//! distinguishable when looking up their spans, so every node is stamped with
//! a [`NodeId`] when it is constructed. Equality on the trees themselves is
//! structural and ignores ids; anything keyed by node goes through the id.

use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(u64);

impl NodeId {
    /// Allocate a fresh id. Ids are never reused within a process.
    pub fn fresh() -> Self {
        NodeId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which family of tree a node belongs to. The recorder keeps one span
/// table per family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Expression,
    Type,
    Unit,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Expression => f.write_str("expression"),
            NodeKind::Type => f.write_str("type"),
            NodeKind::Unit => f.write_str("unit"),
        }
    }
}

/// Implemented by every tree node type the engine can build.
pub trait Identified {
    fn id(&self) -> NodeId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_distinct() {
        let a = NodeId::fresh();
        let b = NodeId::fresh();
        assert_ne!(a, b);
        assert!(b.raw() > a.raw());
    }
}
