//! One-call entry points: lex, build and collect diagnostics for a whole
//! piece of text.

use crate::diagnostic::Diagnostic;
use crate::error::InternalError;
use crate::expression::{self, Expression};
use crate::node::{Identified, NodeKind};
use crate::recorder::LocationRecorder;
use crate::span::Span;
use crate::types::{self, TypeExpression};
use crate::unit::{self, UnitExpression};
use serde::{Deserialize, Serialize};

/// Default cap on the number of diagnostics returned from one parse.
pub const DEFAULT_MAX_DIAGNOSTICS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    pub max_diagnostics: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_diagnostics: DEFAULT_MAX_DIAGNOSTICS,
        }
    }
}

/// The result of parsing one input. The tree is always present; whether it
/// is usable is decided by the diagnostics.
#[derive(Debug)]
pub struct Parsed<N> {
    pub root: N,
    pub diagnostics: Vec<Diagnostic>,
    /// Diagnostics dropped by [`ParseOptions::max_diagnostics`].
    pub truncated: usize,
    pub internal_errors: Vec<InternalError>,
    /// Span and type tables for every node of `root`.
    pub recorder: LocationRecorder,
}

impl<N> Parsed<N> {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty() || self.truncated > 0
    }
}

impl<N: Identified> Parsed<N> {
    /// Where `node` (a node of this parse's tree of `kind`) came from.
    pub fn span_of(&self, kind: NodeKind, node: &impl Identified) -> Result<Span, InternalError> {
        self.recorder.span_of(kind, node.id())
    }
}

fn run<N>(
    kind: NodeKind,
    text: &str,
    options: &ParseOptions,
    parse: impl FnOnce(&mut LocationRecorder, &str, usize) -> N,
) -> Parsed<N> {
    let mut recorder = LocationRecorder::new();
    let root = parse(&mut recorder, text, 0);
    let mut diagnostics = recorder.diagnostics();
    let truncated = diagnostics.len().saturating_sub(options.max_diagnostics);
    diagnostics.truncate(options.max_diagnostics);
    let internal_errors = recorder.take_internal_errors();
    tracing::debug!(
        %kind,
        diagnostics = diagnostics.len(),
        truncated,
        internal = internal_errors.len(),
        "parsed"
    );
    Parsed {
        root,
        diagnostics,
        truncated,
        internal_errors,
        recorder,
    }
}

pub fn parse_expression(text: &str, options: &ParseOptions) -> Parsed<Expression> {
    run(NodeKind::Expression, text, options, expression::lexer::parse_into)
}

pub fn parse_type(text: &str, options: &ParseOptions) -> Parsed<TypeExpression> {
    run(NodeKind::Type, text, options, types::lexer::parse_into)
}

pub fn parse_unit(text: &str, options: &ParseOptions) -> Parsed<UnitExpression> {
    run(NodeKind::Unit, text, options, unit::lexer::parse_into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_are_capped() {
        let options = ParseOptions { max_diagnostics: 2 };
        let parsed = parse_expression("# # # #", &options);
        assert_eq!(parsed.diagnostics.len(), 2);
        assert!(parsed.truncated > 0);
        assert!(parsed.has_errors());
    }

    #[test]
    fn options_default_from_empty_table() {
        let options: ParseOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options.max_diagnostics, DEFAULT_MAX_DIAGNOSTICS);
    }

    #[test]
    fn clean_parse_has_no_internal_errors() {
        let parsed = parse_unit("kg/m^3", &ParseOptions::default());
        assert!(!parsed.has_errors());
        assert!(parsed.internal_errors.is_empty());
        assert_eq!(parsed.span_of(NodeKind::Unit, &parsed.root), Ok(Span::new(0, 6)));
    }
}
