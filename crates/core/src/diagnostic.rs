//! User-facing diagnostics and quick-fixes.
//!
//! Diagnostics are queued while parsing in an unresolved form: their
//! location may be a node whose final span is only known once the enclosing
//! scope closes. [`crate::recorder::LocationRecorder::diagnostics`] resolves
//! them into [`Diagnostic`]s.

use crate::node::{NodeId, NodeKind};
use crate::span::Span;
use serde::{Deserialize, Serialize};

/// A suggested textual replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickFix {
    pub title: String,
    pub span: Span,
    pub replacement: String,
}

/// A finished diagnostic: where, what, and how to fix it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub location: Span,
    pub message: String,
    pub quickfixes: Vec<QuickFix>,
}

impl Diagnostic {
    /// The first quick-fix, which editors offer as the default action.
    pub fn primary_fix(&self) -> Option<&QuickFix> {
        self.quickfixes.first()
    }
}

/// Where a queued diagnostic or fix points before resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Span(Span),
    Node(NodeKind, NodeId),
}

impl From<Span> for Anchor {
    fn from(span: Span) -> Self {
        Anchor::Span(span)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFix {
    pub title: String,
    pub target: Anchor,
    pub replacement: String,
}

impl PendingFix {
    pub fn new(title: impl Into<String>, target: impl Into<Anchor>, replacement: impl Into<String>) -> Self {
        PendingFix {
            title: title.into(),
            target: target.into(),
            replacement: replacement.into(),
        }
    }

    /// Delete whatever `span` covers.
    pub fn delete(span: Span, what: &str) -> Self {
        PendingFix::new(format!("Remove {}", what), span, "")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingDiagnostic {
    pub location: Anchor,
    pub message: String,
    pub fixes: Vec<PendingFix>,
}

/// Apply `fix` to `text`. Spans are char offsets; offsets past the end are
/// clamped so a stale fix never panics.
pub fn apply_fix(text: &str, fix: &QuickFix) -> String {
    let byte_at = |chars: usize| {
        text.char_indices()
            .nth(chars)
            .map(|(b, _)| b)
            .unwrap_or(text.len())
    };
    let start = byte_at(fix.span.start);
    let end = byte_at(fix.span.end).max(start);
    let mut out = String::with_capacity(text.len() + fix.replacement.len());
    out.push_str(&text[..start]);
    out.push_str(&fix.replacement);
    out.push_str(&text[end..]);
    out
}

/// Apply the primary fix of each diagnostic, left to right, skipping any fix
/// that overlaps one already applied. Returns the edited text and how many
/// fixes were used.
pub fn apply_primary_fixes(text: &str, diagnostics: &[Diagnostic]) -> (String, usize) {
    let mut fixes: Vec<&QuickFix> = diagnostics.iter().filter_map(Diagnostic::primary_fix).collect();
    fixes.sort_by_key(|f| (f.span.start, f.span.end));

    let mut accepted: Vec<&QuickFix> = Vec::new();
    for fix in fixes {
        let clashes = accepted.iter().any(|a| {
            a.span == fix.span
                || a.span.overlaps(&fix.span)
                || (fix.span.is_empty() && a.span.start < fix.span.start && fix.span.start < a.span.end)
        });
        if !clashes {
            accepted.push(fix);
        }
    }

    // Right to left so earlier offsets stay valid.
    let mut out = text.to_owned();
    for fix in accepted.iter().rev() {
        out = apply_fix(&out, fix);
    }
    (out, accepted.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix(start: usize, end: usize, replacement: &str) -> QuickFix {
        QuickFix {
            title: "t".into(),
            span: Span::new(start, end),
            replacement: replacement.into(),
        }
    }

    #[test]
    fn apply_fix_inserts_at_empty_span() {
        assert_eq!(apply_fix("(1 + 2", &fix(6, 6, ")")), "(1 + 2)");
    }

    #[test]
    fn apply_fix_counts_chars_not_bytes() {
        assert_eq!(apply_fix("a ± b", &fix(2, 3, "+")), "a + b");
    }

    #[test]
    fn apply_fix_clamps_past_end() {
        assert_eq!(apply_fix("ab", &fix(10, 12, "c")), "abc");
    }

    #[test]
    fn primary_fixes_skip_overlaps() {
        let diags = vec![
            Diagnostic {
                location: Span::new(0, 5),
                message: "m".into(),
                quickfixes: vec![fix(0, 5, "(a+b)")],
            },
            Diagnostic {
                location: Span::new(2, 3),
                message: "m".into(),
                quickfixes: vec![fix(2, 3, "x")],
            },
            Diagnostic {
                location: Span::new(7, 7),
                message: "m".into(),
                quickfixes: vec![fix(7, 7, ")")],
            },
        ];
        let (out, used) = apply_primary_fixes("a + b, c", &diags);
        assert_eq!(used, 2);
        assert_eq!(out, "(a+b), )c");
    }
}
