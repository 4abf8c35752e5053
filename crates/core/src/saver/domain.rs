//! What a tree family has to supply to be parsed by the generic engine.

use crate::error::SemanticError;
use crate::node::{Identified, NodeKind};
use crate::span::Span;
use crate::token::Syntax;
use std::fmt;

/// Operator arity of a precedence class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly two operands. Every occurrence is its own operator section, so
    /// `a / b / c` always needs brackets.
    Binary,
    /// Any number of operands joined by operators of the class.
    Nary,
}

/// Builds a node from the operators of one section and the operands around
/// them (`operands.len() == operators.len() + 1`). `None` means the class
/// refuses this shape in this bracket context.
pub type BuildFn<D> = fn(
    &[<D as Domain>::Op],
    Vec<<D as Domain>::Node>,
    BracketContext,
) -> Option<<D as Domain>::Node>;

/// One precedence class: a set of operators that may be chained together,
/// with a rank (lower binds tighter) and the tighter ranks it nests inside
/// its operands without explicit brackets.
pub struct OperatorClass<D: Domain> {
    pub name: &'static str,
    pub operators: &'static [D::Op],
    pub rank: u8,
    pub arity: Arity,
    pub nests: &'static [u8],
    pub build: BuildFn<D>,
    /// Message used when the builder refuses and nothing else fits.
    pub refusal: &'static str,
}

impl<D: Domain> OperatorClass<D> {
    pub fn contains(&self, op: D::Op) -> bool {
        self.operators.contains(&op)
    }

    pub fn nests_rank(&self, rank: u8) -> bool {
        self.nests.contains(&rank)
    }
}

impl<D: Domain> fmt::Debug for OperatorClass<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorClass")
            .field("name", &self.name)
            .field("operators", &self.operators)
            .field("rank", &self.rank)
            .field("arity", &self.arity)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketShape {
    Round,
    Square,
}

impl BracketShape {
    pub fn opening(self) -> &'static str {
        match self {
            BracketShape::Round => "(",
            BracketShape::Square => "[",
        }
    }
}

/// The bracket context a scope's content is built in, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketContext {
    TopLevel,
    Round,
    Square,
    Apply,
}

/// The bracket context with its payload: for `Apply`, the callee that was
/// detached from the enclosing scope when the bracket opened.
#[derive(Debug, Clone)]
pub enum Brackets<N> {
    TopLevel,
    Round,
    Square,
    Apply { callee: N, callee_span: Span },
}

impl<N> Brackets<N> {
    pub fn context(&self) -> BracketContext {
        match self {
            Brackets::TopLevel => BracketContext::TopLevel,
            Brackets::Round => BracketContext::Round,
            Brackets::Square => BracketContext::Square,
            Brackets::Apply { .. } => BracketContext::Apply,
        }
    }

    /// `Apply` carries a callee and cannot be conjured from a bare context.
    pub fn from_context(context: BracketContext) -> Option<Self> {
        match context {
            BracketContext::TopLevel => Some(Brackets::TopLevel),
            BracketContext::Round => Some(Brackets::Round),
            BracketContext::Square => Some(Brackets::Square),
            BracketContext::Apply => None,
        }
    }

    pub fn from_shape(shape: BracketShape) -> Self {
        match shape {
            BracketShape::Round => Brackets::Round,
            BracketShape::Square => Brackets::Square,
        }
    }
}

/// How the engine should treat a keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeywordRole<S> {
    /// Opens a bracket scope.
    Open(BracketShape),
    /// Closes a bracket scope.
    Close(BracketShape),
    /// Starts a keyword construct in the given stage.
    Begin(S),
    /// Moves an open keyword construct to its next stage, or ends it.
    Continue,
}

/// Outcome of feeding a keyword to a construct stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance<S> {
    Next(S),
    Close,
}

/// Stage type for domains without keyword constructs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoConstruct {}

/// Parts of a keyword construct collected so far, in source order: the
/// keywords themselves and the content built between them.
#[derive(Debug, Clone)]
pub enum ConstructPart<D: Domain> {
    Keyword(D::Keyword, Span),
    Content(D::Node, Span),
}

#[derive(Debug, Clone)]
pub struct ConstructState<D: Domain> {
    pub stage: D::Stage,
    pub opened: Span,
    pub parts: Vec<ConstructPart<D>>,
}

/// A tree family the generic engine can build.
///
/// The engine knows nothing about concrete node shapes: everything from
/// operator tables to bracket handling and keyword constructs goes through
/// this trait.
pub trait Domain: fmt::Debug + Clone + Copy + 'static {
    type Node: Clone + fmt::Debug + PartialEq + Identified;
    type Op: Copy + Eq + fmt::Debug + Syntax + 'static;
    type Keyword: Copy + Eq + fmt::Debug + Syntax;
    type Stage: Clone + fmt::Debug;

    const KIND: NodeKind;
    /// Noun used in messages ("expression", "type", "unit").
    const NOUN: &'static str;

    /// Precedence classes of this domain, in any order; ranks decide binding.
    fn operator_classes() -> &'static [OperatorClass<Self>];

    /// The operator that separates top-level items inside brackets.
    fn separator() -> Option<Self::Op>;

    fn keyword_role(keyword: Self::Keyword) -> KeywordRole<Self::Stage>;

    fn closing_keyword(shape: BracketShape) -> Self::Keyword;

    /// Whether `node`, directly followed by an opening bracket, is applied
    /// to the bracket's content rather than standing next to it.
    fn is_callable(node: &Self::Node, shape: BracketShape) -> bool;

    /// Merge an operand into the operand right before it, e.g. a number and
    /// the unit typed after it.
    fn merge_adjacent(_prev: &Self::Node, _next: &Self::Node) -> Option<Self::Node> {
        None
    }

    /// Absorb a prefix operator into the operand that follows it.
    fn can_be_unary(_op: Self::Op, _operand: &Self::Node) -> Option<Self::Node> {
        None
    }

    fn invalid_ident(text: &str) -> Self::Node;

    fn invalid_operators(items: Vec<Self::Node>) -> Self::Node;

    /// Wrap a node in explicit round brackets.
    fn bracketed(node: Self::Node) -> Self::Node;

    /// Build the node for a bracket's content from its separator-delimited
    /// items, or refuse the shape.
    fn apply_brackets(brackets: &Brackets<Self::Node>, items: Vec<Self::Node>) -> Option<Self::Node>;

    /// Contexts to retry, in order, when content is refused in `context`.
    fn alternate_brackets(_context: BracketContext) -> &'static [BracketContext] {
        &[]
    }

    fn expected_keywords(_stage: &Self::Stage) -> &'static [Self::Keyword] {
        &[]
    }

    fn advance(_stage: &Self::Stage, _keyword: Self::Keyword) -> Option<Advance<Self::Stage>> {
        None
    }

    fn build_construct(_parts: &[ConstructPart<Self>]) -> Option<Self::Node> {
        None
    }

    /// Canonical source text of a node, used for quick-fix replacements.
    fn save(node: &Self::Node) -> String;

    /// Semantic rules that can only be checked on a finished tree.
    fn check(_root: &Self::Node) -> Vec<SemanticError> {
        Vec::new()
    }
}
