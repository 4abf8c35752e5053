use crate::diagnostic::PendingFix;
use crate::node::{NodeId, NodeKind};
use serde::Serialize;

/// A broken invariant inside the engine. These are programmer errors, never
/// the result of anything the user typed, and are reported separately from
/// the user-facing diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
pub enum InternalError {
    /// A span was requested for a node that was never recorded.
    #[error("no span recorded for {kind} node {node}")]
    MissingSpan { kind: NodeKind, node: NodeId },

    /// A keyword construct reached its closing keyword with parts its
    /// domain could not assemble. The stage table should make this
    /// impossible.
    #[error("{kind} construct closed by `{keyword}` could not be built")]
    MalformedConstruct { kind: NodeKind, keyword: String },
}

/// A domain rule the finished tree breaks, e.g. a record naming the same
/// field twice. Raised by a domain's semantic check and turned into an
/// ordinary diagnostic anchored at `node`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct SemanticError {
    pub kind: NodeKind,
    pub node: NodeId,
    pub message: String,
    pub quickfixes: Vec<PendingFix>,
}

impl SemanticError {
    pub fn new(kind: NodeKind, node: NodeId, message: impl Into<String>) -> Self {
        SemanticError {
            kind,
            node,
            message: message.into(),
            quickfixes: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_error_messages_name_the_node() {
        let node = NodeId::fresh();
        let e = InternalError::MissingSpan {
            kind: NodeKind::Unit,
            node,
        };
        assert_eq!(
            e.to_string(),
            format!("no span recorded for unit node {}", node)
        );
    }

    #[test]
    fn semantic_error_displays_message() {
        let e = SemanticError::new(NodeKind::Type, NodeId::fresh(), "duplicate field `a`");
        assert_eq!(e.to_string(), "duplicate field `a`");
        assert!(e.quickfixes.is_empty());
    }
}
