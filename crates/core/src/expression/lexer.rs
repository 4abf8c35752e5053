use super::{Expression, ExpressionDomain, ExpressionKeyword, ExpressionKind, ExpressionOp};
use crate::diagnostic::PendingFix;
use crate::recorder::LocationRecorder;
use crate::saver::{Domain, Saver};
use crate::span::Span;
use crate::{types, unit};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Operator spellings, longest first so `<=` wins over `<`. Display glyphs
/// are accepted too, so display text pasted back in still parses. `±` has no
/// ASCII spelling: `+-` is a plus followed by a sign.
const OPERATORS: &[(&str, ExpressionOp)] = &[
    ("<=", ExpressionOp::LessEqual),
    (">=", ExpressionOp::GreaterEqual),
    ("<>", ExpressionOp::NotEqual),
    ("+", ExpressionOp::Plus),
    ("-", ExpressionOp::Minus),
    ("*", ExpressionOp::Times),
    ("×", ExpressionOp::Times),
    ("/", ExpressionOp::Divide),
    ("^", ExpressionOp::Raise),
    (";", ExpressionOp::Concat),
    ("±", ExpressionOp::PlusMinus),
    ("=", ExpressionOp::Equal),
    ("≠", ExpressionOp::NotEqual),
    ("<", ExpressionOp::Less),
    ("≤", ExpressionOp::LessEqual),
    (">", ExpressionOp::Greater),
    ("≥", ExpressionOp::GreaterEqual),
    ("&", ExpressionOp::And),
    ("|", ExpressionOp::Or),
    (":", ExpressionOp::Colon),
    (",", ExpressionOp::Comma),
];

fn starts_with(chars: &[char], pos: usize, pattern: &str) -> bool {
    pattern
        .chars()
        .enumerate()
        .all(|(i, c)| chars.get(pos + i) == Some(&c))
}

/// Index of the `}` matching the `{` at `open`, counting nested braces.
fn matching_brace(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, &c) in chars.iter().enumerate().skip(open) {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn missing_at_end(recorder: &mut LocationRecorder, end: usize, closer: &str) {
    recorder.add_error(
        Span::empty(end),
        format!("Missing `{}` before end", closer),
        vec![PendingFix::new(format!("Insert `{}`", closer), Span::empty(end), closer)],
    );
}

/// Lex and build the expression in `text`, which starts at char offset
/// `offset` of the document being edited.
pub fn parse_into(recorder: &mut LocationRecorder, text: &str, offset: usize) -> Expression {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut saver = Saver::<ExpressionDomain>::starting_at(recorder, offset);
    let mut pos = 0usize;

    while pos < len {
        let c = chars[pos];
        if c.is_whitespace() {
            pos += 1;
            continue;
        }
        let start = pos;

        // Number literal
        if c.is_ascii_digit() {
            while pos < len && chars[pos].is_ascii_digit() {
                pos += 1;
            }
            if pos + 1 < len && chars[pos] == '.' && chars[pos + 1].is_ascii_digit() {
                pos += 1;
                while pos < len && chars[pos].is_ascii_digit() {
                    pos += 1;
                }
            }
            let literal: String = chars[start..pos].iter().collect();
            let span = Span::new(offset + start, offset + pos);
            match Decimal::from_str(&literal) {
                Ok(value) => saver.save_operand(Expression::number(value), span),
                Err(_) => {
                    saver
                        .recorder()
                        .add_error(span, format!("Number `{}` is out of range", literal), Vec::new());
                    saver.save_operand(ExpressionDomain::invalid_ident(&literal), span);
                }
            }
            continue;
        }

        // Text literal
        if c == '"' {
            pos += 1;
            let mut value = String::new();
            let mut closed = false;
            while pos < len {
                match chars[pos] {
                    '"' => {
                        pos += 1;
                        closed = true;
                        break;
                    }
                    '\\' if pos + 1 < len => {
                        value.push(chars[pos + 1]);
                        pos += 2;
                    }
                    other => {
                        value.push(other);
                        pos += 1;
                    }
                }
            }
            if !closed {
                missing_at_end(saver.recorder(), offset + len, "\"");
            }
            saver.save_operand(Expression::text(value), Span::new(offset + start, offset + pos));
            continue;
        }

        // Identifier, keyword, boolean or `type{...}`
        if c.is_alphabetic() || c == '_' {
            while pos < len && (chars[pos].is_alphanumeric() || chars[pos] == '_') {
                pos += 1;
            }
            let word: String = chars[start..pos].iter().collect();
            let span = Span::new(offset + start, offset + pos);

            if let Some(keyword) = ExpressionKeyword::from_word(&word) {
                saver.save_keyword(keyword, span);
                continue;
            }

            let mut open = pos;
            while open < len && chars[open].is_whitespace() {
                open += 1;
            }
            if word == "type" && open < len && chars[open] == '{' {
                let close = matching_brace(&chars, open);
                let inner_end = close.unwrap_or(len);
                let inner: String = chars[open + 1..inner_end].iter().collect();
                let ty = types::lexer::parse_into(saver.recorder(), &inner, offset + open + 1);
                pos = match close {
                    Some(close) => close + 1,
                    None => {
                        missing_at_end(saver.recorder(), offset + len, "}");
                        len
                    }
                };
                saver.save_operand(
                    Expression::new(ExpressionKind::TypeLiteral { ty }),
                    Span::new(offset + start, offset + pos),
                );
                continue;
            }

            let node = match word.as_str() {
                "true" => Expression::boolean(true),
                "false" => Expression::boolean(false),
                _ => Expression::ident(word),
            };
            saver.save_operand(node, span);
            continue;
        }

        // Unit literal
        if c == '{' {
            let close = chars[start + 1..].iter().position(|&c| c == '}').map(|i| start + 1 + i);
            let inner_end = close.unwrap_or(len);
            let inner: String = chars[start + 1..inner_end].iter().collect();
            let unit = unit::lexer::parse_into(saver.recorder(), &inner, offset + start + 1);
            pos = match close {
                Some(close) => close + 1,
                None => {
                    missing_at_end(saver.recorder(), offset + len, "}");
                    len
                }
            };
            saver.save_operand(
                Expression::new(ExpressionKind::UnitLiteral { unit }),
                Span::new(offset + start, offset + pos),
            );
            continue;
        }

        let bracket = match c {
            '(' => Some(ExpressionKeyword::OpenRound),
            ')' => Some(ExpressionKeyword::CloseRound),
            '[' => Some(ExpressionKeyword::OpenSquare),
            ']' => Some(ExpressionKeyword::CloseSquare),
            _ => None,
        };
        if let Some(keyword) = bracket {
            pos += 1;
            saver.save_keyword(keyword, Span::new(offset + start, offset + pos));
            continue;
        }

        if let Some((spelling, op)) = OPERATORS.iter().find(|(s, _)| starts_with(&chars, pos, s)) {
            pos += spelling.chars().count();
            saver.save_operator(*op, Span::new(offset + start, offset + pos));
            continue;
        }

        pos += 1;
        let span = Span::new(offset + start, offset + pos);
        let text = c.to_string();
        saver
            .recorder()
            .add_error(span, format!("Unexpected character `{}`", text), Vec::new());
        saver.save_operand(ExpressionDomain::invalid_ident(&text), span);
    }

    saver.finish(offset + len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::MatchPattern;
    use crate::node::{Identified, NodeKind};
    use crate::save::{Renames, SaveDestination};
    use crate::types::TypeKind;

    fn parse(text: &str) -> (Expression, LocationRecorder) {
        let mut rec = LocationRecorder::new();
        let e = parse_into(&mut rec, text, 0);
        (e, rec)
    }

    fn source(e: &Expression) -> String {
        e.save(SaveDestination::Source, &Renames::new())
    }

    #[test]
    fn if_then_else_builds_one_node() {
        let (e, mut rec) = parse("if a > 1 then \"big\" else \"small\" endif");
        assert!(rec.diagnostics().is_empty());
        assert!(matches!(e.kind, ExpressionKind::IfThenElse { .. }));
        assert_eq!(rec.span_of(NodeKind::Expression, e.id()), Ok(Span::new(0, 38)));
    }

    #[test]
    fn match_with_guard_and_alternatives() {
        let (e, mut rec) = parse("match x case 1 orcase 2 given y then \"low\" case _ then \"high\" endmatch");
        assert!(rec.diagnostics().is_empty(), "{:?}", rec.diagnostics());
        let ExpressionKind::Match { clauses, .. } = &e.kind else {
            panic!("expected a match, got {:?}", e.kind);
        };
        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[0].patterns.len(), 2);
        assert_eq!(
            clauses[0].patterns[1],
            MatchPattern {
                pattern: Expression::number(Decimal::from(2)),
                guard: Some(Expression::ident("y")),
            }
        );
        assert_eq!(
            source(&e),
            "match x case 1 orcase 2 given y then \"low\" case _ then \"high\" endmatch"
        );
    }

    #[test]
    fn unfinished_if_names_the_next_keyword() {
        let (e, mut rec) = parse("if a then b");
        let diags = rec.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "Missing `else` before end");
        assert_eq!(diags[0].quickfixes[0].replacement, " else");
        assert_eq!(source(&e), "if a then b");
    }

    #[test]
    fn plus_then_minus_is_a_signed_operand() {
        let (e, mut rec) = parse("1 +-2");
        assert!(rec.diagnostics().is_empty(), "{:?}", rec.diagnostics());
        assert!(matches!(e.kind, ExpressionKind::AddSubtract { .. }));
        assert_eq!(source(&e), "1 + -2");

        let (e, mut rec) = parse("5 ± 0.1");
        assert!(rec.diagnostics().is_empty());
        assert!(matches!(e.kind, ExpressionKind::PlusMinus { .. }));
        assert_eq!(source(&e), "5 ± 0.1");
    }

    #[test]
    fn number_and_unit_merge() {
        let (e, mut rec) = parse("9.81 {m/s^2}");
        assert!(rec.diagnostics().is_empty());
        assert!(matches!(&e.kind, ExpressionKind::Number { unit: Some(_), .. }));
        assert_eq!(source(&e), "9.81{m/s^2}");
        assert_eq!(rec.span_of(NodeKind::Expression, e.id()), Ok(Span::new(0, 12)));
    }

    #[test]
    fn type_literal_is_parsed_by_the_type_lexer() {
        let (e, mut rec) = parse("type{(Number{m}, Text)}");
        assert!(rec.diagnostics().is_empty());
        let ExpressionKind::TypeLiteral { ty } = &e.kind else {
            panic!("expected a type literal, got {:?}", e.kind);
        };
        assert!(matches!(ty.kind, TypeKind::Tuple { .. }));
        assert_eq!(rec.span_of(NodeKind::Type, ty.id()), Ok(Span::new(5, 22)));
    }

    #[test]
    fn unterminated_text_is_closed_by_the_fix() {
        let (e, mut rec) = parse("\"abc");
        let diags = rec.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].quickfixes[0].replacement, "\"");
        assert_eq!(e.kind, ExpressionKind::Text { value: "abc".into() });
    }

    #[test]
    fn unknown_character_becomes_invalid_ident() {
        let (e, mut rec) = parse("a # b");
        let diags = rec.diagnostics();
        assert_eq!(diags[0].message, "Unexpected character `#`");
        assert!(e.is_invalid());
    }

    #[test]
    fn display_glyphs_lex_back() {
        let (e, mut rec) = parse("a ≤ b");
        assert!(rec.diagnostics().is_empty());
        assert_eq!(source(&e), "a <= b");
    }
}
