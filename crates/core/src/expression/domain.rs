use super::{Expression, ExpressionKind, MatchClause, MatchPattern};
use crate::error::SemanticError;
use crate::node::NodeKind;
use crate::save::{Renames, SaveDestination};
use crate::saver::{
    Advance, Arity, BracketContext, BracketShape, Brackets, ConstructPart, Domain, KeywordRole,
    OperatorClass,
};
use crate::token::Syntax;
use serde::{Serialize, Serializer};

// ──────────────────────────────────────────────
// Operators and keywords
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpressionOp {
    Plus,
    Minus,
    Times,
    Divide,
    Raise,
    Concat,
    PlusMinus,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
    Colon,
    Comma,
}

impl Syntax for ExpressionOp {
    fn text(&self) -> &'static str {
        match self {
            ExpressionOp::Plus => "+",
            ExpressionOp::Minus => "-",
            ExpressionOp::Times => "*",
            ExpressionOp::Divide => "/",
            ExpressionOp::Raise => "^",
            ExpressionOp::Concat => ";",
            ExpressionOp::PlusMinus => "±",
            ExpressionOp::Equal => "=",
            ExpressionOp::NotEqual => "<>",
            ExpressionOp::Less => "<",
            ExpressionOp::LessEqual => "<=",
            ExpressionOp::Greater => ">",
            ExpressionOp::GreaterEqual => ">=",
            ExpressionOp::And => "&",
            ExpressionOp::Or => "|",
            ExpressionOp::Colon => ":",
            ExpressionOp::Comma => ",",
        }
    }
}

impl ExpressionOp {
    pub fn spelling(self, dest: SaveDestination) -> &'static str {
        match (dest, self) {
            (SaveDestination::Display, ExpressionOp::Times) => "×",
            (SaveDestination::Display, ExpressionOp::NotEqual) => "≠",
            (SaveDestination::Display, ExpressionOp::LessEqual) => "≤",
            (SaveDestination::Display, ExpressionOp::GreaterEqual) => "≥",
            _ => self.text(),
        }
    }
}

impl Serialize for ExpressionOp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.text())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionKeyword {
    OpenRound,
    CloseRound,
    OpenSquare,
    CloseSquare,
    If,
    Then,
    Else,
    EndIf,
    Match,
    Case,
    Given,
    OrCase,
    EndMatch,
}

impl Syntax for ExpressionKeyword {
    fn text(&self) -> &'static str {
        match self {
            ExpressionKeyword::OpenRound => "(",
            ExpressionKeyword::CloseRound => ")",
            ExpressionKeyword::OpenSquare => "[",
            ExpressionKeyword::CloseSquare => "]",
            ExpressionKeyword::If => "if",
            ExpressionKeyword::Then => "then",
            ExpressionKeyword::Else => "else",
            ExpressionKeyword::EndIf => "endif",
            ExpressionKeyword::Match => "match",
            ExpressionKeyword::Case => "case",
            ExpressionKeyword::Given => "given",
            ExpressionKeyword::OrCase => "orcase",
            ExpressionKeyword::EndMatch => "endmatch",
        }
    }
}

impl ExpressionKeyword {
    /// Keywords spelled with letters, for the lexer.
    pub const WORDS: [ExpressionKeyword; 9] = [
        ExpressionKeyword::If,
        ExpressionKeyword::Then,
        ExpressionKeyword::Else,
        ExpressionKeyword::EndIf,
        ExpressionKeyword::Match,
        ExpressionKeyword::Case,
        ExpressionKeyword::Given,
        ExpressionKeyword::OrCase,
        ExpressionKeyword::EndMatch,
    ];

    pub fn from_word(word: &str) -> Option<Self> {
        Self::WORDS.into_iter().find(|kw| kw.text() == word)
    }
}

/// Where an open `if` or `match` is up to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionStage {
    IfCondition,
    IfThen,
    IfElse,
    MatchSubject,
    MatchPattern,
    MatchGuard,
    MatchOutcome,
}

// ──────────────────────────────────────────────
// Operator classes
// ──────────────────────────────────────────────

fn pair(operands: Vec<Expression>) -> Option<(Box<Expression>, Box<Expression>)> {
    let [lhs, rhs]: [Expression; 2] = operands.try_into().ok()?;
    Some((Box::new(lhs), Box::new(rhs)))
}

fn build_raise(_: &[ExpressionOp], operands: Vec<Expression>, _: BracketContext) -> Option<Expression> {
    let (lhs, rhs) = pair(operands)?;
    Some(Expression::new(ExpressionKind::Raise { lhs, rhs }))
}

fn build_times(_: &[ExpressionOp], operands: Vec<Expression>, _: BracketContext) -> Option<Expression> {
    Some(Expression::new(ExpressionKind::Times { operands }))
}

fn build_divide(_: &[ExpressionOp], operands: Vec<Expression>, _: BracketContext) -> Option<Expression> {
    let (lhs, rhs) = pair(operands)?;
    Some(Expression::new(ExpressionKind::Divide { lhs, rhs }))
}

fn build_add_subtract(ops: &[ExpressionOp], operands: Vec<Expression>, _: BracketContext) -> Option<Expression> {
    Some(Expression::new(ExpressionKind::AddSubtract {
        operands,
        operators: ops.to_vec(),
    }))
}

fn build_concat(_: &[ExpressionOp], operands: Vec<Expression>, _: BracketContext) -> Option<Expression> {
    Some(Expression::new(ExpressionKind::Concat { operands }))
}

fn build_plus_minus(_: &[ExpressionOp], operands: Vec<Expression>, _: BracketContext) -> Option<Expression> {
    let (lhs, rhs) = pair(operands)?;
    Some(Expression::new(ExpressionKind::PlusMinus { lhs, rhs }))
}

fn build_equal(_: &[ExpressionOp], operands: Vec<Expression>, _: BracketContext) -> Option<Expression> {
    Some(Expression::new(ExpressionKind::Equal { operands }))
}

fn build_not_equal(_: &[ExpressionOp], operands: Vec<Expression>, _: BracketContext) -> Option<Expression> {
    let (lhs, rhs) = pair(operands)?;
    Some(Expression::new(ExpressionKind::NotEqual { lhs, rhs }))
}

fn build_comparison(ops: &[ExpressionOp], operands: Vec<Expression>, _: BracketContext) -> Option<Expression> {
    Some(Expression::new(ExpressionKind::Comparison {
        operands,
        operators: ops.to_vec(),
    }))
}

fn build_and(_: &[ExpressionOp], operands: Vec<Expression>, _: BracketContext) -> Option<Expression> {
    Some(Expression::new(ExpressionKind::And { operands }))
}

fn build_or(_: &[ExpressionOp], operands: Vec<Expression>, _: BracketContext) -> Option<Expression> {
    Some(Expression::new(ExpressionKind::Or { operands }))
}

fn build_field(_: &[ExpressionOp], operands: Vec<Expression>, context: BracketContext) -> Option<Expression> {
    if context != BracketContext::Round {
        return None;
    }
    let (name, value) = pair(operands)?;
    match name.kind {
        ExpressionKind::Ident { name } => Some(Expression::new(ExpressionKind::Field { name, value })),
        _ => None,
    }
}

const ARITHMETIC: &[u8] = &[0, 1, 2, 3, 4];

static CLASSES: [OperatorClass<ExpressionDomain>; 13] = [
    OperatorClass {
        name: "raise",
        operators: &[ExpressionOp::Raise],
        rank: 0,
        arity: Arity::Binary,
        nests: &[],
        build: build_raise,
        refusal: "",
    },
    OperatorClass {
        name: "times",
        operators: &[ExpressionOp::Times],
        rank: 1,
        arity: Arity::Nary,
        nests: &[0],
        build: build_times,
        refusal: "",
    },
    OperatorClass {
        name: "divide",
        operators: &[ExpressionOp::Divide],
        rank: 1,
        arity: Arity::Binary,
        nests: &[0],
        build: build_divide,
        refusal: "",
    },
    OperatorClass {
        name: "add_subtract",
        operators: &[ExpressionOp::Plus, ExpressionOp::Minus],
        rank: 2,
        arity: Arity::Nary,
        nests: &[0, 1],
        build: build_add_subtract,
        refusal: "",
    },
    OperatorClass {
        name: "concat",
        operators: &[ExpressionOp::Concat],
        rank: 3,
        arity: Arity::Nary,
        nests: &[],
        build: build_concat,
        refusal: "",
    },
    OperatorClass {
        name: "plus_minus",
        operators: &[ExpressionOp::PlusMinus],
        rank: 4,
        arity: Arity::Binary,
        nests: &[0, 1, 2],
        build: build_plus_minus,
        refusal: "",
    },
    OperatorClass {
        name: "equal",
        operators: &[ExpressionOp::Equal],
        rank: 5,
        arity: Arity::Nary,
        nests: ARITHMETIC,
        build: build_equal,
        refusal: "",
    },
    OperatorClass {
        name: "not_equal",
        operators: &[ExpressionOp::NotEqual],
        rank: 5,
        arity: Arity::Binary,
        nests: ARITHMETIC,
        build: build_not_equal,
        refusal: "",
    },
    OperatorClass {
        name: "less",
        operators: &[ExpressionOp::Less, ExpressionOp::LessEqual],
        rank: 5,
        arity: Arity::Nary,
        nests: ARITHMETIC,
        build: build_comparison,
        refusal: "",
    },
    OperatorClass {
        name: "greater",
        operators: &[ExpressionOp::Greater, ExpressionOp::GreaterEqual],
        rank: 5,
        arity: Arity::Nary,
        nests: ARITHMETIC,
        build: build_comparison,
        refusal: "",
    },
    OperatorClass {
        name: "and",
        operators: &[ExpressionOp::And],
        rank: 6,
        arity: Arity::Nary,
        nests: &[5],
        build: build_and,
        refusal: "",
    },
    OperatorClass {
        name: "or",
        operators: &[ExpressionOp::Or],
        rank: 6,
        arity: Arity::Nary,
        nests: &[5],
        build: build_or,
        refusal: "",
    },
    OperatorClass {
        name: "field",
        operators: &[ExpressionOp::Colon],
        rank: 7,
        arity: Arity::Binary,
        nests: &[0, 1, 2, 3, 4, 5, 6],
        build: build_field,
        refusal: "Fields need a name and must be inside round brackets",
    },
];

// ──────────────────────────────────────────────
// Keyword constructs
// ──────────────────────────────────────────────

/// Split construct parts into the opening keyword and each content with the
/// keyword that ended it.
fn segments(parts: &[ConstructPart<ExpressionDomain>]) -> Option<(ExpressionKeyword, Vec<(Expression, ExpressionKeyword)>)> {
    let (first, rest) = parts.split_first()?;
    let ConstructPart::Keyword(opener, _) = first else {
        return None;
    };
    let mut segments = Vec::with_capacity(rest.len() / 2);
    for chunk in rest.chunks(2) {
        match chunk {
            [ConstructPart::Content(node, _), ConstructPart::Keyword(kw, _)] => {
                segments.push((node.clone(), *kw));
            }
            _ => return None,
        }
    }
    Some((*opener, segments))
}

fn build_if(segments: Vec<(Expression, ExpressionKeyword)>) -> Option<Expression> {
    use ExpressionKeyword::{Else, EndIf, Then};
    let [(condition, Then), (then_branch, Else), (else_branch, EndIf)]: [(Expression, ExpressionKeyword); 3] =
        segments.try_into().ok()?
    else {
        return None;
    };
    Some(Expression::new(ExpressionKind::IfThenElse {
        condition: Box::new(condition),
        then_branch: Box::new(then_branch),
        else_branch: Box::new(else_branch),
    }))
}

fn build_match(segments: Vec<(Expression, ExpressionKeyword)>) -> Option<Expression> {
    use ExpressionKeyword::{Case, EndMatch, Given, OrCase, Then};
    let mut iter = segments.into_iter();
    let (subject, Case) = iter.next()? else {
        return None;
    };

    let mut clauses = Vec::new();
    let mut patterns = Vec::new();
    loop {
        let (pattern, mut kw) = iter.next()?;
        let mut guard = None;
        if kw == Given {
            let (condition, next) = iter.next()?;
            guard = Some(condition);
            kw = next;
        }
        patterns.push(MatchPattern { pattern, guard });
        match kw {
            OrCase => continue,
            Then => {
                let (outcome, next) = iter.next()?;
                clauses.push(MatchClause {
                    patterns: std::mem::take(&mut patterns),
                    outcome,
                });
                match next {
                    Case => continue,
                    EndMatch => break,
                    _ => return None,
                }
            }
            _ => return None,
        }
    }
    if iter.next().is_some() {
        return None;
    }
    Some(Expression::new(ExpressionKind::Match {
        subject: Box::new(subject),
        clauses,
    }))
}

// ──────────────────────────────────────────────
// Binding
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct ExpressionDomain;

impl Domain for ExpressionDomain {
    type Node = Expression;
    type Op = ExpressionOp;
    type Keyword = ExpressionKeyword;
    type Stage = ExpressionStage;

    const KIND: NodeKind = NodeKind::Expression;
    const NOUN: &'static str = "expression";

    fn operator_classes() -> &'static [OperatorClass<Self>] {
        &CLASSES
    }

    fn separator() -> Option<ExpressionOp> {
        Some(ExpressionOp::Comma)
    }

    fn keyword_role(keyword: ExpressionKeyword) -> KeywordRole<ExpressionStage> {
        match keyword {
            ExpressionKeyword::OpenRound => KeywordRole::Open(BracketShape::Round),
            ExpressionKeyword::CloseRound => KeywordRole::Close(BracketShape::Round),
            ExpressionKeyword::OpenSquare => KeywordRole::Open(BracketShape::Square),
            ExpressionKeyword::CloseSquare => KeywordRole::Close(BracketShape::Square),
            ExpressionKeyword::If => KeywordRole::Begin(ExpressionStage::IfCondition),
            ExpressionKeyword::Match => KeywordRole::Begin(ExpressionStage::MatchSubject),
            _ => KeywordRole::Continue,
        }
    }

    fn closing_keyword(shape: BracketShape) -> ExpressionKeyword {
        match shape {
            BracketShape::Round => ExpressionKeyword::CloseRound,
            BracketShape::Square => ExpressionKeyword::CloseSquare,
        }
    }

    fn is_callable(node: &Expression, shape: BracketShape) -> bool {
        shape == BracketShape::Round
            && matches!(node.kind, ExpressionKind::Ident { .. } | ExpressionKind::Call { .. })
    }

    fn merge_adjacent(prev: &Expression, next: &Expression) -> Option<Expression> {
        match (&prev.kind, &next.kind) {
            (ExpressionKind::Number { value, unit: None }, ExpressionKind::UnitLiteral { unit }) => {
                Some(Expression::new(ExpressionKind::Number {
                    value: *value,
                    unit: Some(unit.clone()),
                }))
            }
            _ => None,
        }
    }

    fn can_be_unary(op: ExpressionOp, operand: &Expression) -> Option<Expression> {
        let ExpressionKind::Number { value, unit } = &operand.kind else {
            return None;
        };
        let value = match op {
            ExpressionOp::Minus => -*value,
            ExpressionOp::Plus => *value,
            _ => return None,
        };
        Some(Expression::new(ExpressionKind::Number {
            value,
            unit: unit.clone(),
        }))
    }

    fn invalid_ident(text: &str) -> Expression {
        Expression::new(ExpressionKind::InvalidIdent { text: text.to_owned() })
    }

    fn invalid_operators(items: Vec<Expression>) -> Expression {
        Expression::new(ExpressionKind::InvalidOperators { items })
    }

    fn bracketed(node: Expression) -> Expression {
        Expression::new(ExpressionKind::Bracketed { inner: Box::new(node) })
    }

    fn apply_brackets(brackets: &Brackets<Expression>, mut items: Vec<Expression>) -> Option<Expression> {
        let fields = items.iter().filter(|item| item.is_field()).count();
        match brackets {
            Brackets::TopLevel if items.len() == 1 && fields == 0 => items.pop(),
            Brackets::TopLevel => None,
            Brackets::Round if items.is_empty() => None,
            Brackets::Round if fields == items.len() => {
                Some(Expression::new(ExpressionKind::Record { fields: items }))
            }
            Brackets::Round if fields > 0 => None,
            Brackets::Round if items.len() == 1 => items.pop().map(Self::bracketed),
            Brackets::Round => Some(Expression::new(ExpressionKind::Tuple { members: items })),
            Brackets::Square if fields == 0 => Some(Expression::new(ExpressionKind::List { items })),
            Brackets::Square => None,
            Brackets::Apply { callee, .. } if fields == 0 => Some(Expression::new(ExpressionKind::Call {
                callee: Box::new(callee.clone()),
                args: items,
            })),
            Brackets::Apply { .. } => None,
        }
    }

    fn alternate_brackets(context: BracketContext) -> &'static [BracketContext] {
        match context {
            BracketContext::TopLevel => &[BracketContext::Round, BracketContext::Square],
            BracketContext::Square | BracketContext::Apply => &[BracketContext::Round],
            BracketContext::Round => &[],
        }
    }

    fn expected_keywords(stage: &ExpressionStage) -> &'static [ExpressionKeyword] {
        use ExpressionKeyword::*;
        match stage {
            ExpressionStage::IfCondition => &[Then],
            ExpressionStage::IfThen => &[Else],
            ExpressionStage::IfElse => &[EndIf],
            ExpressionStage::MatchSubject => &[Case],
            ExpressionStage::MatchPattern => &[Then, Given, OrCase],
            ExpressionStage::MatchGuard => &[Then, OrCase],
            ExpressionStage::MatchOutcome => &[EndMatch, Case],
        }
    }

    fn advance(stage: &ExpressionStage, keyword: ExpressionKeyword) -> Option<Advance<ExpressionStage>> {
        use ExpressionKeyword as K;
        use ExpressionStage as S;
        let next = match (stage, keyword) {
            (S::IfCondition, K::Then) => Advance::Next(S::IfThen),
            (S::IfThen, K::Else) => Advance::Next(S::IfElse),
            (S::IfElse, K::EndIf) => Advance::Close,
            (S::MatchSubject, K::Case) | (S::MatchOutcome, K::Case) => Advance::Next(S::MatchPattern),
            (S::MatchPattern, K::Given) => Advance::Next(S::MatchGuard),
            (S::MatchPattern | S::MatchGuard, K::OrCase) => Advance::Next(S::MatchPattern),
            (S::MatchPattern | S::MatchGuard, K::Then) => Advance::Next(S::MatchOutcome),
            (S::MatchOutcome, K::EndMatch) => Advance::Close,
            _ => return None,
        };
        Some(next)
    }

    fn build_construct(parts: &[ConstructPart<Self>]) -> Option<Expression> {
        let (opener, segments) = segments(parts)?;
        match opener {
            ExpressionKeyword::If => build_if(segments),
            ExpressionKeyword::Match => build_match(segments),
            _ => None,
        }
    }

    fn save(node: &Expression) -> String {
        node.save(SaveDestination::Source, &Renames::new())
    }

    fn check(root: &Expression) -> Vec<SemanticError> {
        let mut errors = Vec::new();
        root.check(&mut errors);
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_stages_follow_clause_grammar() {
        use ExpressionKeyword as K;
        use ExpressionStage as S;
        assert_eq!(ExpressionDomain::advance(&S::MatchSubject, K::Case), Some(Advance::Next(S::MatchPattern)));
        assert_eq!(ExpressionDomain::advance(&S::MatchSubject, K::Then), None);
        assert_eq!(ExpressionDomain::advance(&S::MatchGuard, K::Given), None);
        assert_eq!(ExpressionDomain::advance(&S::MatchOutcome, K::EndMatch), Some(Advance::Close));
    }

    #[test]
    fn words_map_to_keywords() {
        assert_eq!(ExpressionKeyword::from_word("orcase"), Some(ExpressionKeyword::OrCase));
        assert_eq!(ExpressionKeyword::from_word("("), None);
        assert_eq!(ExpressionKeyword::from_word("iff"), None);
    }

    #[test]
    fn every_operator_but_the_separator_has_one_class() {
        use ExpressionOp::*;
        let all = [
            Plus, Minus, Times, Divide, Raise, Concat, PlusMinus, Equal, NotEqual, Less, LessEqual,
            Greater, GreaterEqual, And, Or, Colon,
        ];
        for op in all {
            let count = CLASSES.iter().filter(|c| c.contains(op)).count();
            assert_eq!(count, 1, "{:?}", op);
        }
        assert!(CLASSES.iter().all(|c| !c.contains(Comma)));
    }
}
