//! Span and error bookkeeping for one parse.
//!
//! A [`LocationRecorder`] is created fresh for every parse of a document and
//! thrown away afterwards. It maps node ids to the span of source text they
//! came from, one table per [`NodeKind`], collects queued diagnostics, and
//! carries the channel for internal invariant violations.

use crate::diagnostic::{Anchor, Diagnostic, PendingDiagnostic, PendingFix, QuickFix};
use crate::error::{InternalError, SemanticError};
use crate::node::{NodeId, NodeKind};
use crate::span::Span;
use crate::types::TypeExpression;
use std::collections::HashMap;

/// Marks a point in the diagnostic queue that speculative work can roll
/// back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

#[derive(Debug, Default)]
pub struct LocationRecorder {
    expression_spans: HashMap<NodeId, Span>,
    type_spans: HashMap<NodeId, Span>,
    unit_spans: HashMap<NodeId, Span>,
    types: HashMap<NodeId, Result<TypeExpression, String>>,
    pending: Vec<PendingDiagnostic>,
    internal: Vec<InternalError>,
}

impl LocationRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, kind: NodeKind) -> &HashMap<NodeId, Span> {
        match kind {
            NodeKind::Expression => &self.expression_spans,
            NodeKind::Type => &self.type_spans,
            NodeKind::Unit => &self.unit_spans,
        }
    }

    fn table_mut(&mut self, kind: NodeKind) -> &mut HashMap<NodeId, Span> {
        match kind {
            NodeKind::Expression => &mut self.expression_spans,
            NodeKind::Type => &mut self.type_spans,
            NodeKind::Unit => &mut self.unit_spans,
        }
    }

    /// Remember where `node` came from. Recording the same node again
    /// replaces the earlier span.
    pub fn record(&mut self, kind: NodeKind, node: NodeId, span: Span) {
        self.table_mut(kind).insert(node, span);
    }

    /// Look up the span of a recorded node.
    pub fn span_of(&self, kind: NodeKind, node: NodeId) -> Result<Span, InternalError> {
        self.table(kind)
            .get(&node)
            .copied()
            .ok_or(InternalError::MissingSpan { kind, node })
    }

    pub fn is_recorded(&self, kind: NodeKind, node: NodeId) -> bool {
        self.table(kind).contains_key(&node)
    }

    /// Store the type (or type error) an external checker computed for a
    /// node.
    pub fn record_type(&mut self, node: NodeId, ty: Result<TypeExpression, String>) {
        self.types.insert(node, ty);
    }

    pub fn recorded_type(&self, node: NodeId) -> Option<&Result<TypeExpression, String>> {
        self.types.get(&node)
    }

    /// Queue an error at `location` with its fixes.
    pub fn add_error(
        &mut self,
        location: impl Into<Anchor>,
        message: impl Into<String>,
        fixes: Vec<PendingFix>,
    ) {
        let message = message.into();
        let location = location.into();
        tracing::debug!(?location, %message, "recorded error");
        self.pending.push(PendingDiagnostic {
            location,
            message,
            fixes,
        });
    }

    /// Convert a domain rejection into an ordinary queued error.
    pub fn add_semantic_error(&mut self, error: SemanticError) {
        self.pending.push(PendingDiagnostic {
            location: Anchor::Node(error.kind, error.node),
            message: error.message,
            fixes: error.quickfixes,
        });
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.pending.len())
    }

    /// Drop every error queued since `checkpoint`.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.pending.truncate(checkpoint.0);
    }

    /// Report a broken invariant. Logged immediately and kept for the caller
    /// of the top-level parse.
    pub fn internal_error(&mut self, error: InternalError) {
        tracing::error!(%error, "internal parser error");
        self.internal.push(error);
    }

    pub fn internal_errors(&self) -> &[InternalError] {
        &self.internal
    }

    pub fn take_internal_errors(&mut self) -> Vec<InternalError> {
        std::mem::take(&mut self.internal)
    }

    fn resolve(&mut self, anchor: Anchor) -> Span {
        match anchor {
            Anchor::Span(span) => span,
            Anchor::Node(kind, node) => match self.span_of(kind, node) {
                Ok(span) => span,
                Err(e) => {
                    self.internal_error(e);
                    Span::empty(0)
                }
            },
        }
    }

    /// Resolve every queued error into a finished diagnostic, in the order
    /// they were recorded. Unresolvable anchors degrade to an empty span at
    /// the start of the document and are reported as internal errors.
    pub fn diagnostics(&mut self) -> Vec<Diagnostic> {
        let pending = self.pending.clone();
        pending
            .into_iter()
            .map(|p| {
                let location = self.resolve(p.location);
                let quickfixes = p
                    .fixes
                    .into_iter()
                    .map(|f| QuickFix {
                        title: f.title,
                        span: self.resolve(f.target),
                        replacement: f.replacement,
                    })
                    .collect();
                Diagnostic {
                    location,
                    message: p.message,
                    quickfixes,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_nodes_keep_separate_spans() {
        let mut rec = LocationRecorder::new();
        let a = NodeId::fresh();
        let b = NodeId::fresh();
        rec.record(NodeKind::Expression, a, Span::new(0, 1));
        rec.record(NodeKind::Expression, b, Span::new(8, 9));
        assert_eq!(rec.span_of(NodeKind::Expression, a), Ok(Span::new(0, 1)));
        assert_eq!(rec.span_of(NodeKind::Expression, b), Ok(Span::new(8, 9)));
    }

    #[test]
    fn span_tables_are_per_kind() {
        let mut rec = LocationRecorder::new();
        let id = NodeId::fresh();
        rec.record(NodeKind::Unit, id, Span::new(2, 3));
        assert!(rec.span_of(NodeKind::Expression, id).is_err());
        assert!(rec.is_recorded(NodeKind::Unit, id));
    }

    #[test]
    fn node_anchored_errors_resolve_late() {
        let mut rec = LocationRecorder::new();
        let id = NodeId::fresh();
        rec.add_error(
            Anchor::Node(NodeKind::Type, id),
            "duplicate field",
            vec![PendingFix::new("Remove", Anchor::Node(NodeKind::Type, id), "")],
        );
        rec.record(NodeKind::Type, id, Span::new(4, 9));
        let diags = rec.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].location, Span::new(4, 9));
        assert_eq!(diags[0].quickfixes[0].span, Span::new(4, 9));
        assert!(rec.internal_errors().is_empty());
    }

    #[test]
    fn unresolvable_anchor_becomes_internal_error() {
        let mut rec = LocationRecorder::new();
        rec.add_error(Anchor::Node(NodeKind::Unit, NodeId::fresh()), "x", vec![]);
        let diags = rec.diagnostics();
        assert_eq!(diags[0].location, Span::empty(0));
        assert_eq!(rec.internal_errors().len(), 1);
    }

    #[test]
    fn rollback_discards_speculative_errors() {
        let mut rec = LocationRecorder::new();
        rec.add_error(Span::new(0, 1), "kept", vec![]);
        let cp = rec.checkpoint();
        rec.add_error(Span::new(1, 2), "dropped", vec![]);
        rec.rollback(cp);
        let diags = rec.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "kept");
    }
}
