//! Type expressions: `Number{m}`, `(Text, Boolean)`, `[Number]`,
//! `(name: Text, age: Number)`, `Optional(Number)`.

pub mod domain;
pub mod lexer;

pub use domain::{TypeBracket, TypeDomain, TypeOp};

use crate::error::SemanticError;
use crate::node::{Identified, NodeId, NodeKind};
use crate::save::{Renames, SaveDestination};
use crate::unit::UnitExpression;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize)]
pub struct TypeExpression {
    #[serde(skip)]
    id: NodeId,
    #[serde(flatten)]
    pub kind: TypeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum TypeKind {
    Ident { name: String },
    NumberWithUnit { unit: UnitExpression },
    Tuple { members: Vec<TypeExpression> },
    List { element: Box<TypeExpression> },
    Record { fields: Vec<TypeExpression> },
    /// `name: Type`, only meaningful inside a record.
    Field { name: String, ty: Box<TypeExpression> },
    Apply {
        callee: Box<TypeExpression>,
        args: Vec<TypeExpression>,
    },
    Bracketed { inner: Box<TypeExpression> },
    InvalidIdent { text: String },
    InvalidOperators { items: Vec<TypeExpression> },
}

impl PartialEq for TypeExpression {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Identified for TypeExpression {
    fn id(&self) -> NodeId {
        self.id
    }
}

impl TypeExpression {
    pub fn new(kind: TypeKind) -> Self {
        TypeExpression {
            id: NodeId::fresh(),
            kind,
        }
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Ident { name: name.into() })
    }

    pub fn is_field(&self) -> bool {
        matches!(self.kind, TypeKind::Field { .. })
    }

    pub fn save(&self, dest: SaveDestination, renames: &Renames) -> String {
        let list = |items: &[TypeExpression]| {
            items
                .iter()
                .map(|item| item.save(dest, renames))
                .collect::<Vec<_>>()
                .join(", ")
        };
        match &self.kind {
            TypeKind::Ident { name } => renames.apply(name).to_owned(),
            TypeKind::NumberWithUnit { unit } => format!("Number{{{}}}", unit.save(dest)),
            TypeKind::Tuple { members } => format!("({})", list(members)),
            TypeKind::List { element } => format!("[{}]", element.save(dest, renames)),
            TypeKind::Record { fields } => format!("({})", list(fields)),
            TypeKind::Field { name, ty } => format!("{}: {}", name, ty.save(dest, renames)),
            TypeKind::Apply { callee, args } => {
                format!("{}({})", callee.save(dest, renames), list(args))
            }
            TypeKind::Bracketed { inner } => format!("({})", inner.save(dest, renames)),
            TypeKind::InvalidIdent { text } => text.clone(),
            TypeKind::InvalidOperators { items } => items
                .iter()
                .map(|item| item.save(dest, renames))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    fn children(&self) -> Vec<&TypeExpression> {
        match &self.kind {
            TypeKind::Ident { .. } | TypeKind::NumberWithUnit { .. } | TypeKind::InvalidIdent { .. } => {
                Vec::new()
            }
            TypeKind::Tuple { members: items }
            | TypeKind::Record { fields: items }
            | TypeKind::InvalidOperators { items } => items.iter().collect(),
            TypeKind::List { element: inner }
            | TypeKind::Field { ty: inner, .. }
            | TypeKind::Bracketed { inner } => vec![inner.as_ref()],
            TypeKind::Apply { callee, args } => std::iter::once(callee.as_ref()).chain(args).collect(),
        }
    }

    pub fn is_invalid(&self) -> bool {
        match &self.kind {
            TypeKind::InvalidIdent { .. } | TypeKind::InvalidOperators { .. } => true,
            TypeKind::NumberWithUnit { unit } => unit.is_invalid(),
            _ => self.children().into_iter().any(Self::is_invalid),
        }
    }

    /// Rules the grammar cannot express: distinct record field names and
    /// at least one argument to a type application.
    pub(crate) fn check(&self, errors: &mut Vec<SemanticError>) {
        match &self.kind {
            TypeKind::Record { fields } => {
                let mut seen = HashSet::new();
                for field in fields {
                    if let TypeKind::Field { name, .. } = &field.kind {
                        if !seen.insert(name.as_str()) {
                            errors.push(SemanticError::new(
                                NodeKind::Type,
                                field.id(),
                                format!("Duplicate field `{}`", name),
                            ));
                        }
                    }
                }
            }
            TypeKind::Apply { callee, args } if args.is_empty() => {
                errors.push(SemanticError::new(
                    NodeKind::Type,
                    self.id(),
                    format!(
                        "`{}` needs at least one type argument",
                        callee.save(SaveDestination::Source, &Renames::new())
                    ),
                ));
            }
            _ => {}
        }
        for child in self.children() {
            child.check(errors);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renames_apply_to_type_names() {
        let mut renames = Renames::new();
        renames.insert("Money", "Currency");
        let ty = TypeExpression::new(TypeKind::List {
            element: Box::new(TypeExpression::ident("Money")),
        });
        assert_eq!(ty.save(SaveDestination::Source, &renames), "[Currency]");
    }

    #[test]
    fn duplicate_fields_are_reported_on_the_second() {
        let field = |name: &str| {
            TypeExpression::new(TypeKind::Field {
                name: name.to_owned(),
                ty: Box::new(TypeExpression::ident("Text")),
            })
        };
        let second = field("a");
        let second_id = second.id();
        let record = TypeExpression::new(TypeKind::Record {
            fields: vec![field("a"), second, field("b")],
        });
        let mut errors = Vec::new();
        record.check(&mut errors);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].node, second_id);
        assert_eq!(errors[0].message, "Duplicate field `a`");
    }
}
