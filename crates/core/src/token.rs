//! The token stream a lexer feeds into a [`crate::saver::Saver`].
//!
//! Operands arrive already built (a literal, an identifier, a nested unit
//! expression); operators and keywords are plain markers. Every token
//! carries the span of source text it came from.

use crate::saver::Domain;
use crate::span::Span;

/// Surface spelling of an operator or keyword.
pub trait Syntax {
    fn text(&self) -> &'static str;

    /// Keywords spelled with letters need whitespace around them when a
    /// quick-fix inserts them next to other text.
    fn is_word(&self) -> bool {
        self.text().chars().all(|c| c.is_ascii_alphabetic())
    }
}

#[derive(Debug, Clone)]
pub enum Token<D: Domain> {
    Operand(D::Node),
    Operator(D::Op),
    Keyword(D::Keyword),
}

#[derive(Debug, Clone)]
pub struct Spanned<D: Domain> {
    pub token: Token<D>,
    pub span: Span,
}

/// One entry in an open scope: an operand or an operator, never a keyword.
#[derive(Debug, Clone)]
pub enum Item<D: Domain> {
    Operand(D::Node, Span),
    Operator(D::Op, Span),
}

impl<D: Domain> Item<D> {
    pub fn span(&self) -> Span {
        match self {
            Item::Operand(_, span) | Item::Operator(_, span) => *span,
        }
    }
}
