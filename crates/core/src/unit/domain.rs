use super::{UnitExpression, UnitKind};
use crate::node::NodeKind;
use crate::save::SaveDestination;
use crate::saver::{
    Arity, BracketContext, BracketShape, Brackets, Domain, KeywordRole, NoConstruct, OperatorClass,
};
use crate::token::Syntax;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOp {
    Times,
    Divide,
    Raise,
    /// Only valid as a sign on a power: `s^-1`.
    Minus,
}

impl Syntax for UnitOp {
    fn text(&self) -> &'static str {
        match self {
            UnitOp::Times => "*",
            UnitOp::Divide => "/",
            UnitOp::Raise => "^",
            UnitOp::Minus => "-",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitBracket {
    Open,
    Close,
}

impl Syntax for UnitBracket {
    fn text(&self) -> &'static str {
        match self {
            UnitBracket::Open => "(",
            UnitBracket::Close => ")",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct UnitDomain;

fn build_times(_: &[UnitOp], operands: Vec<UnitExpression>, _: BracketContext) -> Option<UnitExpression> {
    Some(UnitExpression::new(UnitKind::Times { operands }))
}

fn build_divide(_: &[UnitOp], operands: Vec<UnitExpression>, _: BracketContext) -> Option<UnitExpression> {
    let [numerator, denominator]: [UnitExpression; 2] = operands.try_into().ok()?;
    Some(UnitExpression::new(UnitKind::Divide {
        numerator: Box::new(numerator),
        denominator: Box::new(denominator),
    }))
}

fn build_raise(_: &[UnitOp], operands: Vec<UnitExpression>, _: BracketContext) -> Option<UnitExpression> {
    let [base, exponent]: [UnitExpression; 2] = operands.try_into().ok()?;
    match exponent.kind {
        UnitKind::Scalar { value } => Some(UnitExpression::new(UnitKind::Raise {
            base: Box::new(base),
            power: value,
        })),
        _ => None,
    }
}

static CLASSES: [OperatorClass<UnitDomain>; 3] = [
    OperatorClass {
        name: "raise",
        operators: &[UnitOp::Raise],
        rank: 0,
        arity: Arity::Binary,
        nests: &[],
        build: build_raise,
        refusal: "Unit powers must be whole numbers",
    },
    OperatorClass {
        name: "times",
        operators: &[UnitOp::Times],
        rank: 1,
        arity: Arity::Nary,
        nests: &[0],
        build: build_times,
        refusal: "",
    },
    OperatorClass {
        name: "divide",
        operators: &[UnitOp::Divide],
        rank: 2,
        arity: Arity::Binary,
        nests: &[0, 1],
        build: build_divide,
        refusal: "",
    },
];

impl Domain for UnitDomain {
    type Node = UnitExpression;
    type Op = UnitOp;
    type Keyword = UnitBracket;
    type Stage = NoConstruct;

    const KIND: NodeKind = NodeKind::Unit;
    const NOUN: &'static str = "unit";

    fn operator_classes() -> &'static [OperatorClass<Self>] {
        &CLASSES
    }

    fn separator() -> Option<UnitOp> {
        None
    }

    fn keyword_role(keyword: UnitBracket) -> KeywordRole<NoConstruct> {
        match keyword {
            UnitBracket::Open => KeywordRole::Open(BracketShape::Round),
            UnitBracket::Close => KeywordRole::Close(BracketShape::Round),
        }
    }

    fn closing_keyword(_: BracketShape) -> UnitBracket {
        UnitBracket::Close
    }

    fn is_callable(_: &UnitExpression, _: BracketShape) -> bool {
        false
    }

    fn can_be_unary(op: UnitOp, operand: &UnitExpression) -> Option<UnitExpression> {
        match (op, &operand.kind) {
            (UnitOp::Minus, UnitKind::Scalar { value }) => Some(UnitExpression::scalar(-value)),
            _ => None,
        }
    }

    fn invalid_ident(text: &str) -> UnitExpression {
        UnitExpression::new(UnitKind::InvalidIdent { text: text.to_owned() })
    }

    fn invalid_operators(items: Vec<UnitExpression>) -> UnitExpression {
        UnitExpression::new(UnitKind::InvalidOperators { items })
    }

    fn bracketed(node: UnitExpression) -> UnitExpression {
        UnitExpression::new(UnitKind::Bracketed { inner: Box::new(node) })
    }

    fn apply_brackets(brackets: &Brackets<UnitExpression>, items: Vec<UnitExpression>) -> Option<UnitExpression> {
        let [item]: [UnitExpression; 1] = items.try_into().ok()?;
        match brackets {
            Brackets::TopLevel => Some(item),
            Brackets::Round => Some(Self::bracketed(item)),
            Brackets::Square | Brackets::Apply { .. } => None,
        }
    }

    fn save(node: &UnitExpression) -> String {
        node.save(SaveDestination::Source)
    }
}
