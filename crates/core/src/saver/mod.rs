//! The scope stack engine.
//!
//! A [`Saver`] consumes operands, operators and keywords one at a time, as a
//! lexer produces them, and keeps a stack of open scopes: one for the whole
//! input plus one per bracket or keyword construct that has not been closed
//! yet. When a scope closes, its flat item list is checked, split on the
//! separator and handed to the precedence resolver, and the resulting node
//! becomes an operand of the scope underneath.
//!
//! Nothing the user types makes the engine fail. Every malformed state is
//! recorded as a diagnostic on the [`LocationRecorder`] and replaced by a
//! placeholder node, so [`Saver::finish`] always returns a tree.

pub mod domain;
mod items;
mod precedence;

pub use domain::{
    Advance, Arity, BracketContext, BracketShape, Brackets, BuildFn, ConstructPart,
    ConstructState, Domain, KeywordRole, NoConstruct, OperatorClass,
};

use crate::diagnostic::PendingFix;
use crate::error::InternalError;
use crate::node::Identified;
use crate::recorder::LocationRecorder;
use crate::span::Span;
use crate::token::{Item, Spanned, Syntax, Token};
use items::Group;
use precedence::Resolution;

// ──────────────────────────────────────────────
// Scopes
// ──────────────────────────────────────────────

/// What closes a scope and what its content becomes.
#[derive(Debug, Clone)]
enum Terminator<D: Domain> {
    /// The synthetic outermost scope, closed only by [`Saver::finish`].
    EndOfInput,
    Bracket {
        brackets: Brackets<D::Node>,
        shape: BracketShape,
    },
    Construct(ConstructState<D>),
}

impl<D: Domain> Terminator<D> {
    fn accepts(&self, keyword: D::Keyword) -> bool {
        match self {
            Terminator::EndOfInput => false,
            Terminator::Bracket { shape, .. } => D::closing_keyword(*shape) == keyword,
            Terminator::Construct(state) => D::advance(&state.stage, keyword).is_some(),
        }
    }

    /// The keyword whose absence is reported when this scope is closed by
    /// something else.
    fn expected(&self) -> Option<D::Keyword> {
        match self {
            Terminator::EndOfInput => None,
            Terminator::Bracket { shape, .. } => Some(D::closing_keyword(*shape)),
            Terminator::Construct(state) => D::expected_keywords(&state.stage).first().copied(),
        }
    }
}

#[derive(Debug, Clone)]
struct Scope<D: Domain> {
    /// Span of the token that opened the scope.
    opened: Span,
    /// Where the current content starts, for locating an empty content.
    start: usize,
    items: Vec<Item<D>>,
    terminator: Terminator<D>,
}

impl<D: Domain> Scope<D> {
    fn new(opened: Span, terminator: Terminator<D>) -> Self {
        Scope {
            opened,
            start: opened.end,
            items: Vec::new(),
            terminator,
        }
    }

    /// Span of the current content, or the gap where it should be.
    fn content_span(&self, end: usize) -> Span {
        match (self.items.first(), self.items.last()) {
            (Some(first), Some(last)) => first.span().to(last.span()),
            _ => Span::new(self.start, end.max(self.start)),
        }
    }
}

// ──────────────────────────────────────────────
// Saver
// ──────────────────────────────────────────────

/// Incremental builder for one tree of domain `D`.
pub struct Saver<'r, D: Domain> {
    recorder: &'r mut LocationRecorder,
    top: Scope<D>,
    outer: Vec<Scope<D>>,
}

impl<'r, D: Domain> Saver<'r, D> {
    pub fn new(recorder: &'r mut LocationRecorder) -> Self {
        Self::starting_at(recorder, 0)
    }

    /// A saver for text that starts at `offset` in the document, such as the
    /// unit inside `{...}`.
    pub fn starting_at(recorder: &'r mut LocationRecorder, offset: usize) -> Self {
        Saver {
            recorder,
            top: Scope::new(Span::empty(offset), Terminator::EndOfInput),
            outer: Vec::new(),
        }
    }

    pub fn recorder(&mut self) -> &mut LocationRecorder {
        self.recorder
    }

    /// Number of scopes open above the outermost one.
    pub fn depth(&self) -> usize {
        self.outer.len()
    }

    /// The closing keyword each open scope is waiting for, innermost first.
    pub fn open_scopes(&self) -> Vec<&'static str> {
        std::iter::once(&self.top)
            .chain(self.outer.iter().rev())
            .filter_map(|scope| scope.terminator.expected())
            .map(|kw| kw.text())
            .collect()
    }

    pub fn save(&mut self, token: Spanned<D>) {
        match token.token {
            Token::Operand(node) => self.save_operand(node, token.span),
            Token::Operator(op) => self.save_operator(op, token.span),
            Token::Keyword(keyword) => self.save_keyword(keyword, token.span),
        }
    }

    /// Append an operand to the innermost scope, merging it into the operand
    /// before it where the domain allows (a number followed by its unit).
    pub fn save_operand(&mut self, node: D::Node, span: Span) {
        tracing::trace!(kind = %D::KIND, %span, "operand");
        if let Some(Item::Operand(prev, prev_span)) = self.top.items.last() {
            if let Some(merged) = D::merge_adjacent(prev, &node) {
                let merged_span = prev_span.to(span);
                self.recorder.record(D::KIND, merged.id(), merged_span);
                self.top.items.pop();
                self.top.items.push(Item::Operand(merged, merged_span));
                return;
            }
        }
        self.recorder.record(D::KIND, node.id(), span);
        self.top.items.push(Item::Operand(node, span));
    }

    pub fn save_operator(&mut self, op: D::Op, span: Span) {
        tracing::trace!(kind = %D::KIND, op = op.text(), %span, "operator");
        self.top.items.push(Item::Operator(op, span));
    }

    pub fn save_keyword(&mut self, keyword: D::Keyword, span: Span) {
        tracing::trace!(kind = %D::KIND, keyword = keyword.text(), %span, "keyword");
        match D::keyword_role(keyword) {
            KeywordRole::Open(shape) => self.open_bracket(shape, span),
            KeywordRole::Begin(stage) => {
                let state = ConstructState {
                    stage,
                    opened: span,
                    parts: vec![ConstructPart::Keyword(keyword, span)],
                };
                self.push(Scope::new(span, Terminator::Construct(state)));
            }
            KeywordRole::Close(_) | KeywordRole::Continue => self.close_with(keyword, span),
        }
    }

    fn push(&mut self, scope: Scope<D>) {
        let below = std::mem::replace(&mut self.top, scope);
        self.outer.push(below);
        tracing::debug!(depth = self.outer.len(), "opened scope");
    }

    fn pop(&mut self) -> Option<Scope<D>> {
        let below = self.outer.pop()?;
        tracing::debug!(depth = self.outer.len(), "closed scope");
        Some(std::mem::replace(&mut self.top, below))
    }

    fn open_bracket(&mut self, shape: BracketShape, span: Span) {
        let callable = matches!(
            self.top.items.last(),
            Some(Item::Operand(node, _)) if D::is_callable(node, shape)
        );
        let brackets = match self.top.items.pop() {
            Some(Item::Operand(callee, callee_span)) if callable => Brackets::Apply {
                callee,
                callee_span,
            },
            Some(other) => {
                self.top.items.push(other);
                Brackets::from_shape(shape)
            }
            None => Brackets::from_shape(shape),
        };
        self.push(Scope::new(span, Terminator::Bracket { brackets, shape }));
    }

    fn expected_anywhere(&self, keyword: D::Keyword) -> bool {
        self.top.terminator.accepts(keyword)
            || self.outer.iter().any(|scope| scope.terminator.accepts(keyword))
    }

    fn close_with(&mut self, keyword: D::Keyword, span: Span) {
        if self.outer.is_empty() {
            let what = format!("`{}`", keyword.text());
            self.recorder.add_error(
                span,
                format!("Unexpected {}", what),
                vec![PendingFix::delete(span, &what)],
            );
            return;
        }
        while !self.top.terminator.accepts(keyword) {
            self.missing(Some(keyword), span.start);
            self.abandon_top(span.start);
            if !self.expected_anywhere(keyword) {
                return;
            }
        }
        self.advance_top(keyword, span);
    }

    /// Record that the innermost scope's terminator is missing before
    /// `found` (or before the end of input).
    fn missing(&mut self, found: Option<D::Keyword>, at: usize) {
        let before = match found {
            Some(kw) => format!("`{}`", kw.text()),
            None => "end".to_owned(),
        };
        match self.top.terminator.expected() {
            Some(expected) => {
                let text = expected.text();
                let insertion = match (expected.is_word(), found) {
                    (true, Some(_)) => format!("{} ", text),
                    (true, None) => format!(" {}", text),
                    (false, _) => text.to_owned(),
                };
                self.recorder.add_error(
                    Span::empty(at),
                    format!("Missing `{}` before {}", text, before),
                    vec![PendingFix::new(format!("Insert `{}`", text), Span::empty(at), insertion)],
                );
            }
            None => self.recorder.add_error(
                Span::empty(at),
                format!("Missing closing keyword before {}", before),
                Vec::new(),
            ),
        }
    }

    /// Close the innermost scope without its terminator and hand whatever it
    /// built to the scope below.
    fn abandon_top(&mut self, end: usize) {
        let Some(scope) = self.pop() else {
            return;
        };
        let content_span = scope.content_span(end);
        let last_end = scope
            .items
            .last()
            .map(|item| item.span().end)
            .unwrap_or(scope.opened.end);
        match scope.terminator {
            Terminator::EndOfInput => {}
            Terminator::Bracket { brackets, .. } => {
                let start = match &brackets {
                    Brackets::Apply { callee_span, .. } => callee_span.start,
                    _ => scope.opened.start,
                };
                let node = self.make_content(scope.items, &brackets, content_span);
                self.save_operand(node, Span::new(start, last_end));
            }
            Terminator::Construct(mut state) => {
                if !scope.items.is_empty() {
                    let node = self.make_content(scope.items, &Brackets::TopLevel, content_span);
                    state.parts.push(ConstructPart::Content(node, content_span));
                }
                let node = self.construct_into_invalid(&state.parts);
                self.save_operand(node, Span::new(state.opened.start, last_end));
            }
        }
    }

    /// The innermost scope accepts `keyword`: close it or move its construct
    /// to the next stage.
    fn advance_top(&mut self, keyword: D::Keyword, span: Span) {
        let content_span = self.top.content_span(span.start);
        let items = std::mem::take(&mut self.top.items);
        let terminator = std::mem::replace(&mut self.top.terminator, Terminator::EndOfInput);
        match terminator {
            Terminator::EndOfInput => {}
            Terminator::Bracket { brackets, .. } => {
                let start = match &brackets {
                    Brackets::Apply { callee_span, .. } => callee_span.start,
                    _ => self.top.opened.start,
                };
                let node = self.make_content(items, &brackets, content_span);
                let _ = self.pop();
                self.save_operand(node, Span::new(start, span.end));
            }
            Terminator::Construct(mut state) => {
                let content = self.make_content(items, &Brackets::TopLevel, content_span);
                self.recorder.record(D::KIND, content.id(), content_span);
                state.parts.push(ConstructPart::Content(content, content_span));
                state.parts.push(ConstructPart::Keyword(keyword, span));
                match D::advance(&state.stage, keyword) {
                    Some(Advance::Next(stage)) => {
                        tracing::debug!(?stage, "construct advanced");
                        state.stage = stage;
                        self.top.start = span.end;
                        self.top.terminator = Terminator::Construct(state);
                    }
                    Some(Advance::Close) | None => {
                        let node = match D::build_construct(&state.parts) {
                            Some(node) => node,
                            None => {
                                self.recorder.internal_error(InternalError::MalformedConstruct {
                                    kind: D::KIND,
                                    keyword: keyword.text().to_owned(),
                                });
                                self.construct_into_invalid(&state.parts)
                            }
                        };
                        let _ = self.pop();
                        self.save_operand(node, Span::new(state.opened.start, span.end));
                    }
                }
            }
        }
    }

    fn construct_into_invalid(&mut self, parts: &[ConstructPart<D>]) -> D::Node {
        let nodes = parts
            .iter()
            .map(|part| match part {
                ConstructPart::Keyword(kw, span) => {
                    let node = D::invalid_ident(kw.text());
                    self.recorder.record(D::KIND, node.id(), *span);
                    node
                }
                ConstructPart::Content(node, _) => node.clone(),
            })
            .collect();
        D::invalid_operators(nodes)
    }

    // ──────────────────────────────────────────────
    // Building a scope's content
    // ──────────────────────────────────────────────

    /// Turn a closed scope's items into one node for `brackets`.
    fn make_content(
        &mut self,
        items: Vec<Item<D>>,
        brackets: &Brackets<D::Node>,
        content_span: Span,
    ) -> D::Node {
        let items = items::absorb_unary(self.recorder, items);

        if items.is_empty() {
            if let Some(node) = D::apply_brackets(brackets, Vec::new()) {
                return node;
            }
            self.recorder
                .add_error(content_span, format!("Missing {}", D::NOUN), Vec::new());
            let node = D::invalid_operators(Vec::new());
            self.recorder.record(D::KIND, node.id(), content_span);
            return Self::wrap_invalid(brackets, node);
        }

        let problems = items::alternation_problems(&items);
        if !problems.is_empty() {
            for problem in problems {
                self.recorder.add_error(problem.span, problem.message, Vec::new());
            }
            let node = items::into_invalid(self.recorder, items);
            self.recorder.record(D::KIND, node.id(), content_span);
            return Self::wrap_invalid(brackets, node);
        }

        let groups = items::split_groups(items.clone());
        let reason = match self.attempt(brackets, &groups) {
            Ok(node) => return node,
            Err(reason) => reason,
        };

        for alternate in D::alternate_brackets(brackets.context()) {
            let Some(alt) = Brackets::from_context(*alternate) else {
                continue;
            };
            let Ok(alt_node) = self.attempt(&alt, &groups) else {
                continue;
            };
            self.recorder.record(D::KIND, alt_node.id(), content_span);
            let text = D::save(&alt_node);
            let Some(wrapped) = D::apply_brackets(brackets, vec![alt_node]) else {
                continue;
            };
            tracing::debug!(?alternate, "content accepted in alternate brackets");
            self.recorder.add_error(
                content_span,
                "Surrounding brackets required",
                vec![PendingFix::new(format!("Add brackets: {}", text), content_span, text)],
            );
            return wrapped;
        }

        self.recorder.add_error(content_span, reason, Vec::new());
        let node = items::into_invalid(self.recorder, items);
        self.recorder.record(D::KIND, node.id(), content_span);
        Self::wrap_invalid(brackets, node)
    }

    /// Put invalid content back inside its brackets, keeping any callee, so
    /// the saved text still shows what was typed around it.
    fn wrap_invalid(brackets: &Brackets<D::Node>, node: D::Node) -> D::Node {
        if let Brackets::TopLevel = brackets {
            return node;
        }
        if let Some(wrapped) = D::apply_brackets(brackets, vec![node.clone()]) {
            return wrapped;
        }
        match brackets {
            Brackets::TopLevel => node,
            Brackets::Round => D::bracketed(node),
            Brackets::Square => {
                let shape = BracketShape::Square;
                D::invalid_operators(vec![
                    D::invalid_ident(shape.opening()),
                    node,
                    D::invalid_ident(D::closing_keyword(shape).text()),
                ])
            }
            Brackets::Apply { callee, .. } => D::invalid_operators(vec![callee.clone(), D::bracketed(node)]),
        }
    }

    /// Resolve every group and wrap them for `brackets`. On refusal, errors
    /// recorded on the way are rolled back.
    fn attempt(&mut self, brackets: &Brackets<D::Node>, groups: &[Group<D>]) -> Result<D::Node, String> {
        let checkpoint = self.recorder.checkpoint();
        let context = brackets.context();
        let mut nodes = Vec::with_capacity(groups.len());
        for group in groups {
            match precedence::resolve::<D>(self.recorder, group, context) {
                Resolution::Node(node) => nodes.push(node),
                Resolution::Refused(reason) => {
                    self.recorder.rollback(checkpoint);
                    return Err(reason.to_owned());
                }
            }
        }
        match D::apply_brackets(brackets, nodes) {
            Some(node) => Ok(node),
            None => {
                self.recorder.rollback(checkpoint);
                Err(if groups.len() > 1 {
                    "Multiple items are not allowed here".to_owned()
                } else {
                    format!("This {} is not allowed here", D::NOUN)
                })
            }
        }
    }

    /// Close every open scope and return the root. `end` is the offset just
    /// past the input.
    pub fn finish(mut self, end: usize) -> D::Node {
        while !self.outer.is_empty() {
            self.missing(None, end);
            self.abandon_top(end);
        }
        let content_span = self.top.content_span(end);
        let items = std::mem::take(&mut self.top.items);
        let root = self.make_content(items, &Brackets::TopLevel, content_span);
        self.recorder.record(D::KIND, root.id(), content_span);
        for error in D::check(&root) {
            self.recorder.add_semantic_error(error);
        }
        root
    }
}
