//! Operator-precedence resolution for one separator-free group.
//!
//! The group is first cut into operator sections (maximal runs of one
//! precedence class). A single section is handed to its class builder. With
//! several sections the resolver climbs: the loosest sections must all be of
//! one class, and the loosest operator of each run between them must be of a
//! rank that class nests implicitly. Anything else is a mixed-operator error.
//! Its quick-fixes are the bracketings that make the group valid, led by the
//! one-click fix for `a & b + c & d`, where bracketing the middle section
//! leaves a single outer section.

use super::domain::{Arity, BracketContext, Domain};
use super::items::{group_into_invalid, Group};
use crate::diagnostic::PendingFix;
use crate::node::Identified;
use crate::recorder::LocationRecorder;
use crate::span::Span;
use crate::token::Syntax;

/// How many nested rounds of bracketing a quick-fix may add.
const MAX_BRACKET_DEPTH: usize = 2;

pub(crate) enum Resolution<N> {
    Node(N),
    /// A builder refused the group; carries the reason.
    Refused(&'static str),
}

enum Climb<N> {
    Built(N),
    Refused(&'static str),
    Ambiguous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Section {
    class: usize,
    rank: u8,
    /// First and last operator index, inclusive.
    first: usize,
    last: usize,
}

/// Cut the operators into sections. `Err` carries the index of an operator
/// that belongs to no class.
fn partition<D: Domain>(ops: &[(D::Op, Span)]) -> Result<Vec<Section>, usize> {
    let classes = D::operator_classes();
    let mut sections: Vec<Section> = Vec::new();
    for (i, (op, _)) in ops.iter().enumerate() {
        let Some(class) = classes.iter().position(|c| c.contains(*op)) else {
            return Err(i);
        };
        match sections.last_mut() {
            Some(s) if s.class == class && classes[class].arity == Arity::Nary => s.last = i,
            _ => sections.push(Section {
                class,
                rank: classes[class].rank,
                first: i,
                last: i,
            }),
        }
    }
    Ok(sections)
}

fn span_of<N>(operands: &[(N, Span)]) -> Span {
    match (operands.first(), operands.last()) {
        (Some((_, first)), Some((_, last))) => first.to(*last),
        _ => Span::empty(0),
    }
}

pub(crate) fn resolve<D: Domain>(
    recorder: &mut LocationRecorder,
    group: &Group<D>,
    context: BracketContext,
) -> Resolution<D::Node> {
    let operands = &group.operands;
    let ops = &group.operators;
    if ops.is_empty() {
        return match operands.first() {
            Some((node, _)) => Resolution::Node(node.clone()),
            None => Resolution::Node(D::invalid_operators(Vec::new())),
        };
    }

    let span = group.span();
    let sections = match partition::<D>(ops) {
        Ok(sections) => sections,
        Err(i) => {
            let (op, op_span) = ops[i];
            recorder.add_error(
                op_span,
                format!("Operator `{}` cannot be used in a {}", op.text(), D::NOUN),
                Vec::new(),
            );
            let node = group_into_invalid::<D>(recorder, group);
            recorder.record(D::KIND, node.id(), span);
            return Resolution::Node(node);
        }
    };

    match climb::<D>(recorder, operands, ops, &sections, context) {
        Climb::Built(node) => Resolution::Node(node),
        Climb::Refused(reason) => Resolution::Refused(reason),
        Climb::Ambiguous => {
            let preferred = symmetric::<D>(recorder, operands, ops, &sections, context);
            let others = candidates::<D>(recorder, operands, ops, &sections, context, MAX_BRACKET_DEPTH);
            let mut texts: Vec<String> = Vec::new();
            for candidate in preferred.into_iter().chain(others) {
                let text = D::save(&candidate);
                if !texts.contains(&text) {
                    texts.push(text);
                }
            }
            tracing::debug!(
                sections = sections.len(),
                fixes = texts.len(),
                "mixed operators in {}",
                D::NOUN
            );
            let fixes = texts
                .into_iter()
                .map(|text| PendingFix::new(format!("Add brackets: {}", text), span, text))
                .collect();
            recorder.add_error(span, "Mixed operators: brackets required", fixes);
            let node = group_into_invalid::<D>(recorder, group);
            recorder.record(D::KIND, node.id(), span);
            Resolution::Node(node)
        }
    }
}

fn build<D: Domain>(
    recorder: &mut LocationRecorder,
    class: usize,
    operands: &[(D::Node, Span)],
    ops: &[(D::Op, Span)],
    context: BracketContext,
) -> Climb<D::Node> {
    let info = &D::operator_classes()[class];
    let op_list: Vec<D::Op> = ops.iter().map(|(op, _)| *op).collect();
    let nodes: Vec<D::Node> = operands.iter().map(|(node, _)| node.clone()).collect();
    match (info.build)(&op_list, nodes, context) {
        Some(node) => {
            recorder.record(D::KIND, node.id(), span_of(operands));
            Climb::Built(node)
        }
        None => Climb::Refused(info.refusal),
    }
}

fn climb<D: Domain>(
    recorder: &mut LocationRecorder,
    operands: &[(D::Node, Span)],
    ops: &[(D::Op, Span)],
    sections: &[Section],
    context: BracketContext,
) -> Climb<D::Node> {
    if ops.is_empty() {
        return match operands.first() {
            Some((node, _)) => Climb::Built(node.clone()),
            None => Climb::Ambiguous,
        };
    }
    if let [only] = sections {
        return build::<D>(recorder, only.class, operands, ops, context);
    }
    let Some(loosest) = sections.iter().map(|s| s.rank).max() else {
        return Climb::Ambiguous;
    };
    let outer: Vec<&Section> = sections.iter().filter(|s| s.rank == loosest).collect();
    let class = outer[0].class;
    if outer.iter().any(|s| s.class != class) {
        return Climb::Ambiguous;
    }
    let info = &D::operator_classes()[class];
    if info.arity == Arity::Binary && outer.len() > 1 {
        return Climb::Ambiguous;
    }

    let split: Vec<usize> = outer.iter().flat_map(|s| s.first..=s.last).collect();
    let mut bounds = split.clone();
    bounds.push(ops.len());

    let mut children: Vec<(D::Node, Span)> = Vec::with_capacity(bounds.len());
    let mut start = 0;
    for end in bounds {
        let sub_operands = &operands[start..=end];
        let sub_ops = &ops[start..end];
        let Ok(sub_sections) = partition::<D>(sub_ops) else {
            return Climb::Ambiguous;
        };
        // Deeper operators are checked when the run itself is climbed.
        if let Some(rank) = sub_sections.iter().map(|s| s.rank).max() {
            if !info.nests_rank(rank) {
                return Climb::Ambiguous;
            }
        }
        match climb::<D>(recorder, sub_operands, sub_ops, &sub_sections, BracketContext::TopLevel) {
            Climb::Built(node) => children.push((node, span_of(sub_operands))),
            other => return other,
        }
        start = end + 1;
    }

    let split_ops: Vec<(D::Op, Span)> = split.iter().map(|&i| ops[i]).collect();
    build::<D>(recorder, class, &children, &split_ops, context)
}

/// `a & b + c & d`: three sections, the outer two of one n-ary class that
/// binds no tighter than the middle. Bracketing the middle section in place
/// merges the outer two into one.
fn symmetric<D: Domain>(
    recorder: &mut LocationRecorder,
    operands: &[(D::Node, Span)],
    ops: &[(D::Op, Span)],
    sections: &[Section],
    context: BracketContext,
) -> Option<D::Node> {
    let [left, middle, right] = sections else {
        return None;
    };
    let outer = &D::operator_classes()[left.class];
    if left.class != right.class || outer.arity != Arity::Nary || left.rank < middle.rank {
        return None;
    }
    let inner_operands = &operands[middle.first..=middle.last + 1];
    let Climb::Built(inner) = build::<D>(
        recorder,
        middle.class,
        inner_operands,
        &ops[middle.first..=middle.last],
        BracketContext::Round,
    ) else {
        return None;
    };
    let inner_span = span_of(inner_operands);
    let bracketed = D::bracketed(inner);
    recorder.record(D::KIND, bracketed.id(), inner_span);

    let mut merged = operands[..middle.first].to_vec();
    merged.push((bracketed, inner_span));
    merged.extend_from_slice(&operands[middle.last + 2..]);
    let mut merged_ops = ops[..middle.first].to_vec();
    merged_ops.extend_from_slice(&ops[middle.last + 1..]);
    match build::<D>(recorder, left.class, &merged, &merged_ops, context) {
        Climb::Built(node) => Some(node),
        _ => None,
    }
}

/// Whole-group trees that become valid by bracketing one section (or, with
/// `depth > 1`, a few sections in turn). Tightest-binding sections are tried
/// first, left to right within a rank; that order is the ranking of the
/// resulting quick-fixes.
fn candidates<D: Domain>(
    recorder: &mut LocationRecorder,
    operands: &[(D::Node, Span)],
    ops: &[(D::Op, Span)],
    sections: &[Section],
    context: BracketContext,
    depth: usize,
) -> Vec<D::Node> {
    let mut order: Vec<usize> = (0..sections.len()).collect();
    order.sort_by_key(|&i| sections[i].rank);

    let mut found = Vec::new();
    for i in order {
        let section = sections[i];
        let inner_operands = &operands[section.first..=section.last + 1];
        let Climb::Built(inner) = build::<D>(
            recorder,
            section.class,
            inner_operands,
            &ops[section.first..=section.last],
            BracketContext::Round,
        ) else {
            continue;
        };
        let inner_span = span_of(inner_operands);
        let bracketed = D::bracketed(inner);
        recorder.record(D::KIND, bracketed.id(), inner_span);

        let mut new_operands = operands[..section.first].to_vec();
        new_operands.push((bracketed, inner_span));
        new_operands.extend_from_slice(&operands[section.last + 2..]);
        let mut new_ops = ops[..section.first].to_vec();
        new_ops.extend_from_slice(&ops[section.last + 1..]);

        let Ok(new_sections) = partition::<D>(&new_ops) else {
            continue;
        };
        match climb::<D>(recorder, &new_operands, &new_ops, &new_sections, context) {
            Climb::Built(node) => found.push(node),
            Climb::Ambiguous if depth > 1 => found.extend(candidates::<D>(
                recorder,
                &new_operands,
                &new_ops,
                &new_sections,
                context,
                depth - 1,
            )),
            _ => {}
        }
    }
    found
}
