//! cellex-core: incremental, error-tolerant parsing of spreadsheet
//! expressions, types and units.
//!
//! A lexer turns text into operands, operators and keywords and feeds them
//! one at a time to a [`Saver`], which keeps a stack of open bracket and
//! keyword scopes and resolves operator precedence as each scope closes.
//! Malformed input never fails the parse: it produces placeholder nodes plus
//! span-anchored [`Diagnostic`]s carrying quick-fixes.
//!
//! # Public API
//!
//! - [`parse_expression()`], [`parse_type()`], [`parse_unit()`]: parse a
//!   whole string and collect its diagnostics
//! - [`Expression`], [`TypeExpression`], [`UnitExpression`]: the trees, with
//!   `save()` for round-trippable text
//! - [`LocationRecorder`]: node id to span tables and the diagnostic queue
//! - [`Saver`] and [`Domain`]: the generic engine and what a tree family
//!   supplies to it
//! - [`apply_fix()`], [`apply_primary_fixes()`]: apply quick-fixes to text

pub mod clipboard;
pub mod diagnostic;
pub mod error;
pub mod expression;
pub mod node;
pub mod parse;
pub mod recorder;
pub mod save;
pub mod saver;
pub mod span;
pub mod token;
pub mod types;
pub mod unit;

// ── Convenience re-exports: key types ────────────────────────────────

pub use diagnostic::{apply_fix, apply_primary_fixes, Diagnostic, QuickFix};
pub use error::{InternalError, SemanticError};
pub use expression::{Expression, ExpressionKind};
pub use node::{Identified, NodeId, NodeKind};
pub use recorder::LocationRecorder;
pub use save::{Renames, SaveDestination};
pub use saver::{Domain, Saver};
pub use span::Span;
pub use types::{TypeExpression, TypeKind};
pub use unit::{UnitExpression, UnitKind};

// ── Convenience re-exports: entry points ─────────────────────────────

pub use parse::{parse_expression, parse_type, parse_unit, ParseOptions, Parsed, DEFAULT_MAX_DIAGNOSTICS};
