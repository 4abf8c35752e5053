//! Unit expressions: `m`, `kg*m/s^2`, `1/s`.

pub mod domain;
pub mod lexer;

pub use domain::{UnitBracket, UnitDomain, UnitOp};

use crate::node::{Identified, NodeId};
use crate::save::{class_of, needs_brackets, SaveDestination};
use crate::saver::OperatorClass;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct UnitExpression {
    #[serde(skip)]
    id: NodeId,
    #[serde(flatten)]
    pub kind: UnitKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum UnitKind {
    Name { name: String },
    /// A plain integer factor; `1` is the dimensionless unit.
    Scalar { value: i64 },
    Times { operands: Vec<UnitExpression> },
    Divide {
        numerator: Box<UnitExpression>,
        denominator: Box<UnitExpression>,
    },
    Raise { base: Box<UnitExpression>, power: i64 },
    Bracketed { inner: Box<UnitExpression> },
    InvalidIdent { text: String },
    InvalidOperators { items: Vec<UnitExpression> },
}

impl PartialEq for UnitExpression {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Identified for UnitExpression {
    fn id(&self) -> NodeId {
        self.id
    }
}

impl UnitExpression {
    pub fn new(kind: UnitKind) -> Self {
        UnitExpression {
            id: NodeId::fresh(),
            kind,
        }
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self::new(UnitKind::Name { name: name.into() })
    }

    pub fn scalar(value: i64) -> Self {
        Self::new(UnitKind::Scalar { value })
    }

    pub fn is_invalid(&self) -> bool {
        match &self.kind {
            UnitKind::InvalidIdent { .. } | UnitKind::InvalidOperators { .. } => true,
            UnitKind::Name { .. } | UnitKind::Scalar { .. } => false,
            UnitKind::Times { operands } => operands.iter().any(Self::is_invalid),
            UnitKind::Divide {
                numerator,
                denominator,
            } => numerator.is_invalid() || denominator.is_invalid(),
            UnitKind::Raise { base, .. } => base.is_invalid(),
            UnitKind::Bracketed { inner } => inner.is_invalid(),
        }
    }

    fn class(&self) -> Option<&'static OperatorClass<UnitDomain>> {
        match &self.kind {
            UnitKind::Times { .. } => class_of::<UnitDomain>(UnitOp::Times),
            UnitKind::Divide { .. } => class_of::<UnitDomain>(UnitOp::Divide),
            UnitKind::Raise { .. } => class_of::<UnitDomain>(UnitOp::Raise),
            _ => None,
        }
    }

    /// Units are written without spaces: `kg*m/s^2`.
    pub fn save(&self, dest: SaveDestination) -> String {
        match &self.kind {
            UnitKind::Name { name } => name.clone(),
            UnitKind::Scalar { value } => value.to_string(),
            UnitKind::Times { operands } => {
                let times = match dest {
                    SaveDestination::Source => "*",
                    SaveDestination::Display => "×",
                };
                operands
                    .iter()
                    .map(|operand| self.save_operand(operand, dest))
                    .collect::<Vec<_>>()
                    .join(times)
            }
            UnitKind::Divide {
                numerator,
                denominator,
            } => {
                format!(
                    "{}/{}",
                    self.save_operand(numerator, dest),
                    self.save_operand(denominator, dest)
                )
            }
            UnitKind::Raise { base, power } => {
                format!("{}^{}", self.save_operand(base, dest), power)
            }
            UnitKind::Bracketed { inner } => format!("({})", inner.save(dest)),
            UnitKind::InvalidIdent { text } => text.clone(),
            UnitKind::InvalidOperators { items } => items
                .iter()
                .map(|item| item.save(dest))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    fn save_operand(&self, operand: &UnitExpression, dest: SaveDestination) -> String {
        let text = operand.save(dest);
        match self.class() {
            Some(parent) if needs_brackets(parent, operand.class()) => format!("({})", text),
            _ => text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn times(operands: Vec<UnitExpression>) -> UnitExpression {
        UnitExpression::new(UnitKind::Times { operands })
    }

    fn divide(a: UnitExpression, b: UnitExpression) -> UnitExpression {
        UnitExpression::new(UnitKind::Divide {
            numerator: Box::new(a),
            denominator: Box::new(b),
        })
    }

    fn raise(base: UnitExpression, power: i64) -> UnitExpression {
        UnitExpression::new(UnitKind::Raise {
            base: Box::new(base),
            power,
        })
    }

    #[test]
    fn saves_without_spaces() {
        let unit = divide(
            times(vec![UnitExpression::name("kg"), UnitExpression::name("m")]),
            raise(UnitExpression::name("s"), 2),
        );
        assert_eq!(unit.save(SaveDestination::Source), "kg*m/s^2");
        assert_eq!(unit.save(SaveDestination::Display), "kg×m/s^2");
    }

    #[test]
    fn nested_divide_gets_brackets() {
        let unit = divide(
            divide(UnitExpression::name("m"), UnitExpression::name("s")),
            UnitExpression::name("s"),
        );
        assert_eq!(unit.save(SaveDestination::Source), "(m/s)/s");
    }

    #[test]
    fn equality_ignores_identity() {
        let a = UnitExpression::name("m");
        let b = UnitExpression::name("m");
        assert_ne!(a.id(), b.id());
        assert_eq!(a, b);
    }

    #[test]
    fn serializes_with_node_tag() {
        let json = serde_json::to_value(raise(UnitExpression::name("s"), -1)).unwrap();
        assert_eq!(json["node"], "raise");
        assert_eq!(json["power"], -1);
        assert_eq!(json["base"]["name"], "s");
    }
}
