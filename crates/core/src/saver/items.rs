//! Checks and reshaping of a scope's flat item list before precedence
//! resolution.

use super::domain::Domain;
use crate::node::Identified;
use crate::recorder::LocationRecorder;
use crate::span::Span;
use crate::token::{Item, Syntax};

/// A run of operands and operators between separators. Always holds one
/// more operand than operators.
#[derive(Debug, Clone)]
pub(crate) struct Group<D: Domain> {
    pub operands: Vec<(D::Node, Span)>,
    pub operators: Vec<(D::Op, Span)>,
}

impl<D: Domain> Group<D> {
    fn new() -> Self {
        Group {
            operands: Vec::new(),
            operators: Vec::new(),
        }
    }

    pub fn span(&self) -> Span {
        match (self.operands.first(), self.operands.last()) {
            (Some((_, first)), Some((_, last))) => first.to(*last),
            _ => Span::empty(0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Problem {
    pub span: Span,
    pub message: String,
}

/// Collapse prefix operators into the operand that follows them wherever
/// the domain allows it. Only an operator with no operand before it (at the
/// start, or right after another operator) is a candidate.
pub(crate) fn absorb_unary<D: Domain>(
    recorder: &mut LocationRecorder,
    items: Vec<Item<D>>,
) -> Vec<Item<D>> {
    let mut out: Vec<Item<D>> = Vec::with_capacity(items.len());
    let mut iter = items.into_iter().peekable();
    while let Some(item) = iter.next() {
        if let Item::Operator(op, op_span) = &item {
            let prefix = matches!(out.last(), None | Some(Item::Operator(..)));
            if prefix {
                if let Some(Item::Operand(next, next_span)) = iter.peek() {
                    if let Some(node) = D::can_be_unary(*op, next) {
                        let span = op_span.to(*next_span);
                        iter.next();
                        tracing::trace!(op = op.text(), %span, "absorbed unary operator");
                        recorder.record(D::KIND, node.id(), span);
                        out.push(Item::Operand(node, span));
                        continue;
                    }
                }
            }
        }
        out.push(item);
    }
    out
}

/// Every place the list fails to alternate operand, operator, ..., operand.
pub(crate) fn alternation_problems<D: Domain>(items: &[Item<D>]) -> Vec<Problem> {
    let mut problems = Vec::new();
    let mut prev: Option<&Item<D>> = None;
    for item in items {
        match (prev, item) {
            (None, Item::Operator(op, span)) => problems.push(Problem {
                span: *span,
                message: format!("Missing item before `{}`", op.text()),
            }),
            (Some(Item::Operator(a, a_span)), Item::Operator(b, b_span)) => problems.push(Problem {
                span: a_span.gap_to(*b_span),
                message: format!("Missing item between `{}` and `{}`", a.text(), b.text()),
            }),
            (Some(Item::Operand(_, a_span)), Item::Operand(_, b_span)) => problems.push(Problem {
                span: a_span.gap_to(*b_span),
                message: "Missing operator".to_owned(),
            }),
            _ => {}
        }
        prev = Some(item);
    }
    if let Some(Item::Operator(op, span)) = items.last() {
        problems.push(Problem {
            span: *span,
            message: format!("Missing item after `{}`", op.text()),
        });
    }
    problems
}

/// Split a well-alternating item list on the domain's separator.
pub(crate) fn split_groups<D: Domain>(items: Vec<Item<D>>) -> Vec<Group<D>> {
    let separator = D::separator();
    let mut groups = Vec::new();
    let mut current = Group::new();
    for item in items {
        match item {
            Item::Operator(op, _) if Some(op) == separator => {
                groups.push(std::mem::replace(&mut current, Group::new()));
            }
            Item::Operator(op, span) => current.operators.push((op, span)),
            Item::Operand(node, span) => current.operands.push((node, span)),
        }
    }
    groups.push(current);
    groups
}

/// Keep everything the user typed in one invalid node. Operators become
/// invalid identifiers so the node still saves back to the same text.
pub(crate) fn into_invalid<D: Domain>(recorder: &mut LocationRecorder, items: Vec<Item<D>>) -> D::Node {
    let nodes = items
        .into_iter()
        .map(|item| match item {
            Item::Operand(node, _) => node,
            Item::Operator(op, span) => {
                let node = D::invalid_ident(op.text());
                recorder.record(D::KIND, node.id(), span);
                node
            }
        })
        .collect();
    D::invalid_operators(nodes)
}

/// Same as [`into_invalid`] for a group that already passed alternation.
pub(crate) fn group_into_invalid<D: Domain>(recorder: &mut LocationRecorder, group: &Group<D>) -> D::Node {
    let mut items = Vec::with_capacity(group.operands.len() + group.operators.len());
    for (i, (node, span)) in group.operands.iter().enumerate() {
        if i > 0 {
            if let Some((op, op_span)) = group.operators.get(i - 1) {
                items.push(Item::Operator(*op, *op_span));
            }
        }
        items.push(Item::Operand(node.clone(), *span));
    }
    into_invalid::<D>(recorder, items)
}
