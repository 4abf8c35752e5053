//! Expression trees: the formulas typed into cells and column definitions.

pub mod domain;
pub mod lexer;

pub use domain::{ExpressionDomain, ExpressionKeyword, ExpressionOp, ExpressionStage};

use crate::error::SemanticError;
use crate::node::{Identified, NodeId, NodeKind};
use crate::save::{class_of, escape_text, needs_brackets, Renames, SaveDestination};
use crate::saver::OperatorClass;
use crate::types::TypeExpression;
use crate::unit::UnitExpression;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize)]
pub struct Expression {
    #[serde(skip)]
    id: NodeId,
    #[serde(flatten)]
    pub kind: ExpressionKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum ExpressionKind {
    Ident {
        name: String,
    },
    Number {
        value: Decimal,
        unit: Option<UnitExpression>,
    },
    Text {
        value: String,
    },
    Boolean {
        value: bool,
    },
    UnitLiteral {
        unit: UnitExpression,
    },
    TypeLiteral {
        ty: TypeExpression,
    },
    Call {
        callee: Box<Expression>,
        args: Vec<Expression>,
    },
    Tuple {
        members: Vec<Expression>,
    },
    List {
        items: Vec<Expression>,
    },
    Record {
        fields: Vec<Expression>,
    },
    /// `name: value`, only meaningful inside a record.
    Field {
        name: String,
        value: Box<Expression>,
    },
    Bracketed {
        inner: Box<Expression>,
    },
    IfThenElse {
        condition: Box<Expression>,
        then_branch: Box<Expression>,
        else_branch: Box<Expression>,
    },
    Match {
        subject: Box<Expression>,
        clauses: Vec<MatchClause>,
    },
    AddSubtract {
        operands: Vec<Expression>,
        operators: Vec<ExpressionOp>,
    },
    Times {
        operands: Vec<Expression>,
    },
    Divide {
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    Raise {
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    Concat {
        operands: Vec<Expression>,
    },
    PlusMinus {
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    Equal {
        operands: Vec<Expression>,
    },
    NotEqual {
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    /// A chain of `<`/`<=` or of `>`/`>=`.
    Comparison {
        operands: Vec<Expression>,
        operators: Vec<ExpressionOp>,
    },
    And {
        operands: Vec<Expression>,
    },
    Or {
        operands: Vec<Expression>,
    },
    InvalidIdent {
        text: String,
    },
    InvalidOperators {
        items: Vec<Expression>,
    },
}

/// One `case ... then ...` arm. Alternatives joined with `orcase` share the
/// outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchClause {
    pub patterns: Vec<MatchPattern>,
    pub outcome: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchPattern {
    pub pattern: Expression,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guard: Option<Expression>,
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Identified for Expression {
    fn id(&self) -> NodeId {
        self.id
    }
}

impl Expression {
    pub fn new(kind: ExpressionKind) -> Self {
        Expression {
            id: NodeId::fresh(),
            kind,
        }
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Self::new(ExpressionKind::Ident { name: name.into() })
    }

    pub fn number(value: Decimal) -> Self {
        Self::new(ExpressionKind::Number { value, unit: None })
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::new(ExpressionKind::Text { value: value.into() })
    }

    pub fn boolean(value: bool) -> Self {
        Self::new(ExpressionKind::Boolean { value })
    }

    pub fn is_field(&self) -> bool {
        matches!(self.kind, ExpressionKind::Field { .. })
    }

    /// All direct sub-expressions, in source order.
    pub fn children(&self) -> Vec<&Expression> {
        use ExpressionKind as E;
        match &self.kind {
            E::Ident { .. }
            | E::Number { .. }
            | E::Text { .. }
            | E::Boolean { .. }
            | E::UnitLiteral { .. }
            | E::TypeLiteral { .. }
            | E::InvalidIdent { .. } => Vec::new(),
            E::Call { callee, args } => std::iter::once(callee.as_ref()).chain(args).collect(),
            E::Tuple { members: items }
            | E::List { items }
            | E::Record { fields: items }
            | E::AddSubtract { operands: items, .. }
            | E::Times { operands: items }
            | E::Concat { operands: items }
            | E::Equal { operands: items }
            | E::Comparison { operands: items, .. }
            | E::And { operands: items }
            | E::Or { operands: items }
            | E::InvalidOperators { items } => items.iter().collect(),
            E::Field { value: inner, .. } | E::Bracketed { inner } => vec![inner.as_ref()],
            E::Divide { lhs, rhs }
            | E::Raise { lhs, rhs }
            | E::PlusMinus { lhs, rhs }
            | E::NotEqual { lhs, rhs } => vec![lhs.as_ref(), rhs.as_ref()],
            E::IfThenElse {
                condition,
                then_branch,
                else_branch,
            } => vec![condition.as_ref(), then_branch.as_ref(), else_branch.as_ref()],
            E::Match { subject, clauses } => {
                let mut out = vec![subject.as_ref()];
                for clause in clauses {
                    for pattern in &clause.patterns {
                        out.push(&pattern.pattern);
                        out.extend(pattern.guard.as_ref());
                    }
                    out.push(&clause.outcome);
                }
                out
            }
        }
    }

    /// Whether any part of the tree is a placeholder for malformed input.
    pub fn is_invalid(&self) -> bool {
        match &self.kind {
            ExpressionKind::InvalidIdent { .. } | ExpressionKind::InvalidOperators { .. } => true,
            ExpressionKind::Number { unit: Some(unit), .. } | ExpressionKind::UnitLiteral { unit } => {
                unit.is_invalid()
            }
            ExpressionKind::TypeLiteral { ty } => ty.is_invalid(),
            _ => self.children().into_iter().any(Self::is_invalid),
        }
    }

    /// The precedence class of this node's operator, if it is an operator
    /// node.
    fn class(&self) -> Option<&'static OperatorClass<ExpressionDomain>> {
        use ExpressionKind as E;
        let op = match &self.kind {
            E::AddSubtract { .. } => ExpressionOp::Plus,
            E::Times { .. } => ExpressionOp::Times,
            E::Divide { .. } => ExpressionOp::Divide,
            E::Raise { .. } => ExpressionOp::Raise,
            E::Concat { .. } => ExpressionOp::Concat,
            E::PlusMinus { .. } => ExpressionOp::PlusMinus,
            E::Equal { .. } => ExpressionOp::Equal,
            E::NotEqual { .. } => ExpressionOp::NotEqual,
            E::Comparison { operators, .. } => *operators.first()?,
            E::And { .. } => ExpressionOp::And,
            E::Or { .. } => ExpressionOp::Or,
            E::Field { .. } => ExpressionOp::Colon,
            _ => return None,
        };
        class_of::<ExpressionDomain>(op)
    }

    pub fn save(&self, dest: SaveDestination, renames: &Renames) -> String {
        use ExpressionKind as E;
        let list = |items: &[Expression]| {
            items
                .iter()
                .map(|item| item.save(dest, renames))
                .collect::<Vec<_>>()
                .join(", ")
        };
        match &self.kind {
            E::Ident { name } => renames.apply(name).to_owned(),
            E::Number { value, unit } => match unit {
                Some(unit) => format!("{}{{{}}}", value, unit.save(dest)),
                None => value.to_string(),
            },
            E::Text { value } => escape_text(value),
            E::Boolean { value } => value.to_string(),
            E::UnitLiteral { unit } => format!("{{{}}}", unit.save(dest)),
            E::TypeLiteral { ty } => format!("type{{{}}}", ty.save(dest, renames)),
            E::Call { callee, args } => format!("{}({})", callee.save(dest, renames), list(args)),
            E::Tuple { members } => format!("({})", list(members)),
            E::List { items } => format!("[{}]", list(items)),
            E::Record { fields } => format!("({})", list(fields)),
            E::Field { name, value } => {
                format!("{}: {}", name, self.save_operand(value, dest, renames))
            }
            E::Bracketed { inner } => format!("({})", inner.save(dest, renames)),
            E::IfThenElse {
                condition,
                then_branch,
                else_branch,
            } => format!(
                "if {} then {} else {} endif",
                condition.save(dest, renames),
                then_branch.save(dest, renames),
                else_branch.save(dest, renames)
            ),
            E::Match { subject, clauses } => {
                let mut out = format!("match {}", subject.save(dest, renames));
                for clause in clauses {
                    for (i, pattern) in clause.patterns.iter().enumerate() {
                        out.push_str(if i == 0 { " case " } else { " orcase " });
                        out.push_str(&pattern.pattern.save(dest, renames));
                        if let Some(guard) = &pattern.guard {
                            out.push_str(" given ");
                            out.push_str(&guard.save(dest, renames));
                        }
                    }
                    out.push_str(" then ");
                    out.push_str(&clause.outcome.save(dest, renames));
                }
                out.push_str(" endmatch");
                out
            }
            E::AddSubtract { operands, operators } | E::Comparison { operands, operators } => {
                self.save_chain(operands, |i| operators.get(i).copied(), dest, renames)
            }
            E::Times { operands } => self.save_chain(operands, |_| Some(ExpressionOp::Times), dest, renames),
            E::Concat { operands } => self.save_chain(operands, |_| Some(ExpressionOp::Concat), dest, renames),
            E::Equal { operands } => self.save_chain(operands, |_| Some(ExpressionOp::Equal), dest, renames),
            E::And { operands } => self.save_chain(operands, |_| Some(ExpressionOp::And), dest, renames),
            E::Or { operands } => self.save_chain(operands, |_| Some(ExpressionOp::Or), dest, renames),
            E::Divide { lhs, rhs } => self.save_binary(lhs, ExpressionOp::Divide, rhs, dest, renames),
            E::Raise { lhs, rhs } => self.save_binary(lhs, ExpressionOp::Raise, rhs, dest, renames),
            E::PlusMinus { lhs, rhs } => self.save_binary(lhs, ExpressionOp::PlusMinus, rhs, dest, renames),
            E::NotEqual { lhs, rhs } => self.save_binary(lhs, ExpressionOp::NotEqual, rhs, dest, renames),
            E::InvalidIdent { text } => text.clone(),
            E::InvalidOperators { items } => items
                .iter()
                .map(|item| item.save(dest, renames))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    fn save_chain(
        &self,
        operands: &[Expression],
        op_at: impl Fn(usize) -> Option<ExpressionOp>,
        dest: SaveDestination,
        renames: &Renames,
    ) -> String {
        let mut out = String::new();
        for (i, operand) in operands.iter().enumerate() {
            if i > 0 {
                let op = op_at(i - 1).map(|op| op.spelling(dest)).unwrap_or("?");
                out.push(' ');
                out.push_str(op);
                out.push(' ');
            }
            out.push_str(&self.save_operand(operand, dest, renames));
        }
        out
    }

    fn save_binary(
        &self,
        lhs: &Expression,
        op: ExpressionOp,
        rhs: &Expression,
        dest: SaveDestination,
        renames: &Renames,
    ) -> String {
        format!(
            "{} {} {}",
            self.save_operand(lhs, dest, renames),
            op.spelling(dest),
            self.save_operand(rhs, dest, renames)
        )
    }

    fn save_operand(&self, operand: &Expression, dest: SaveDestination, renames: &Renames) -> String {
        let text = operand.save(dest, renames);
        match self.class() {
            Some(parent) if needs_brackets(parent, operand.class()) => format!("({})", text),
            _ => text,
        }
    }

    /// Record field names must be distinct.
    pub(crate) fn check(&self, errors: &mut Vec<SemanticError>) {
        if let ExpressionKind::Record { fields } = &self.kind {
            let mut seen = HashSet::new();
            for field in fields {
                if let ExpressionKind::Field { name, .. } = &field.kind {
                    if !seen.insert(name.as_str()) {
                        errors.push(SemanticError::new(
                            NodeKind::Expression,
                            field.id(),
                            format!("Duplicate field `{}`", name),
                        ));
                    }
                }
            }
        }
        for child in self.children() {
            child.check(errors);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn num(s: &str) -> Expression {
        Expression::number(Decimal::from_str(s).unwrap())
    }

    fn add(a: Expression, b: Expression) -> Expression {
        Expression::new(ExpressionKind::AddSubtract {
            operands: vec![a, b],
            operators: vec![ExpressionOp::Plus],
        })
    }

    fn source(e: &Expression) -> String {
        e.save(SaveDestination::Source, &Renames::new())
    }

    #[test]
    fn looser_child_is_bracketed() {
        let e = Expression::new(ExpressionKind::Times {
            operands: vec![add(num("1"), num("2")), num("3")],
        });
        assert_eq!(source(&e), "(1 + 2) * 3");
    }

    #[test]
    fn and_brackets_arithmetic_but_not_comparisons() {
        let e = Expression::new(ExpressionKind::And {
            operands: vec![
                add(Expression::ident("a"), Expression::ident("b")),
                Expression::new(ExpressionKind::Equal {
                    operands: vec![Expression::ident("c"), Expression::ident("d")],
                }),
            ],
        });
        assert_eq!(source(&e), "(a + b) & c = d");
    }

    #[test]
    fn display_uses_glyphs() {
        let e = Expression::new(ExpressionKind::Comparison {
            operands: vec![num("1"), num("2"), num("3")],
            operators: vec![ExpressionOp::LessEqual, ExpressionOp::Less],
        });
        assert_eq!(e.save(SaveDestination::Display, &Renames::new()), "1 ≤ 2 < 3");
        assert_eq!(source(&e), "1 <= 2 < 3");
    }

    #[test]
    fn renames_apply_to_identifiers_only() {
        let mut renames = Renames::new();
        renames.insert("price", "cost");
        let e = Expression::new(ExpressionKind::Call {
            callee: Box::new(Expression::ident("round")),
            args: vec![Expression::ident("price"), Expression::text("price")],
        });
        assert_eq!(e.save(SaveDestination::Source, &renames), "round(cost, \"price\")");
    }

    #[test]
    fn numbers_keep_their_scale_and_unit() {
        let e = Expression::new(ExpressionKind::Number {
            value: Decimal::from_str("1.50").unwrap(),
            unit: Some(UnitExpression::name("m")),
        });
        assert_eq!(source(&e), "1.50{m}");
    }

    #[test]
    fn serializes_tagged_without_ids() {
        let json = serde_json::to_value(add(num("1"), Expression::ident("x"))).unwrap();
        assert_eq!(json["node"], "add_subtract");
        assert_eq!(json["operators"][0], "+");
        assert_eq!(json["operands"][0]["value"], "1");
        assert!(json.get("id").is_none());
    }
}
