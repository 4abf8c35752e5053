use super::{TypeExpression, TypeKind};
use crate::error::SemanticError;
use crate::node::NodeKind;
use crate::save::{Renames, SaveDestination};
use crate::saver::{
    Arity, BracketContext, BracketShape, Brackets, Domain, KeywordRole, NoConstruct, OperatorClass,
};
use crate::token::Syntax;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeOp {
    Colon,
    Comma,
}

impl Syntax for TypeOp {
    fn text(&self) -> &'static str {
        match self {
            TypeOp::Colon => ":",
            TypeOp::Comma => ",",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeBracket {
    OpenRound,
    CloseRound,
    OpenSquare,
    CloseSquare,
}

impl Syntax for TypeBracket {
    fn text(&self) -> &'static str {
        match self {
            TypeBracket::OpenRound => "(",
            TypeBracket::CloseRound => ")",
            TypeBracket::OpenSquare => "[",
            TypeBracket::CloseSquare => "]",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TypeDomain;

fn build_field(_: &[TypeOp], operands: Vec<TypeExpression>, context: BracketContext) -> Option<TypeExpression> {
    if context != BracketContext::Round {
        return None;
    }
    let [name, ty]: [TypeExpression; 2] = operands.try_into().ok()?;
    match name.kind {
        TypeKind::Ident { name } => Some(TypeExpression::new(TypeKind::Field {
            name,
            ty: Box::new(ty),
        })),
        _ => None,
    }
}

static CLASSES: [OperatorClass<TypeDomain>; 1] = [OperatorClass {
    name: "field",
    operators: &[TypeOp::Colon],
    rank: 0,
    arity: Arity::Binary,
    nests: &[],
    build: build_field,
    refusal: "Fields need a name and must be inside round brackets",
}];

impl Domain for TypeDomain {
    type Node = TypeExpression;
    type Op = TypeOp;
    type Keyword = TypeBracket;
    type Stage = NoConstruct;

    const KIND: NodeKind = NodeKind::Type;
    const NOUN: &'static str = "type";

    fn operator_classes() -> &'static [OperatorClass<Self>] {
        &CLASSES
    }

    fn separator() -> Option<TypeOp> {
        Some(TypeOp::Comma)
    }

    fn keyword_role(keyword: TypeBracket) -> KeywordRole<NoConstruct> {
        match keyword {
            TypeBracket::OpenRound => KeywordRole::Open(BracketShape::Round),
            TypeBracket::CloseRound => KeywordRole::Close(BracketShape::Round),
            TypeBracket::OpenSquare => KeywordRole::Open(BracketShape::Square),
            TypeBracket::CloseSquare => KeywordRole::Close(BracketShape::Square),
        }
    }

    fn closing_keyword(shape: BracketShape) -> TypeBracket {
        match shape {
            BracketShape::Round => TypeBracket::CloseRound,
            BracketShape::Square => TypeBracket::CloseSquare,
        }
    }

    fn is_callable(node: &TypeExpression, shape: BracketShape) -> bool {
        shape == BracketShape::Round && matches!(node.kind, TypeKind::Ident { .. })
    }

    fn invalid_ident(text: &str) -> TypeExpression {
        TypeExpression::new(TypeKind::InvalidIdent { text: text.to_owned() })
    }

    fn invalid_operators(items: Vec<TypeExpression>) -> TypeExpression {
        TypeExpression::new(TypeKind::InvalidOperators { items })
    }

    fn bracketed(node: TypeExpression) -> TypeExpression {
        TypeExpression::new(TypeKind::Bracketed { inner: Box::new(node) })
    }

    fn apply_brackets(brackets: &Brackets<TypeExpression>, mut items: Vec<TypeExpression>) -> Option<TypeExpression> {
        let fields = items.iter().filter(|item| item.is_field()).count();
        match brackets {
            Brackets::TopLevel if items.len() == 1 && fields == 0 => items.pop(),
            Brackets::TopLevel => None,
            Brackets::Round if items.is_empty() => None,
            Brackets::Round if fields == items.len() => {
                Some(TypeExpression::new(TypeKind::Record { fields: items }))
            }
            Brackets::Round if fields > 0 => None,
            Brackets::Round if items.len() == 1 => items.pop().map(Self::bracketed),
            Brackets::Round => Some(TypeExpression::new(TypeKind::Tuple { members: items })),
            Brackets::Square if items.len() == 1 && fields == 0 => {
                items.pop().map(|element| {
                    TypeExpression::new(TypeKind::List {
                        element: Box::new(element),
                    })
                })
            }
            Brackets::Square => None,
            Brackets::Apply { callee, .. } if fields == 0 => Some(TypeExpression::new(TypeKind::Apply {
                callee: Box::new(callee.clone()),
                args: items,
            })),
            Brackets::Apply { .. } => None,
        }
    }

    fn alternate_brackets(context: BracketContext) -> &'static [BracketContext] {
        match context {
            BracketContext::TopLevel | BracketContext::Square => &[BracketContext::Round],
            BracketContext::Round | BracketContext::Apply => &[],
        }
    }

    fn save(node: &TypeExpression) -> String {
        node.save(SaveDestination::Source, &Renames::new())
    }

    fn check(root: &TypeExpression) -> Vec<SemanticError> {
        let mut errors = Vec::new();
        root.check(&mut errors);
        errors
    }
}
