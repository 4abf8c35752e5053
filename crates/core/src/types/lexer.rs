use super::{TypeBracket, TypeDomain, TypeExpression, TypeKind, TypeOp};
use crate::diagnostic::PendingFix;
use crate::recorder::LocationRecorder;
use crate::saver::{Domain, Saver};
use crate::span::Span;
use crate::unit;

/// Lex and build the type in `text`, which starts at char offset `offset`
/// of the document being edited.
pub fn parse_into(recorder: &mut LocationRecorder, text: &str, offset: usize) -> TypeExpression {
    let chars: Vec<char> = text.chars().collect();
    let mut saver = Saver::<TypeDomain>::starting_at(recorder, offset);
    let mut pos = 0usize;

    while pos < chars.len() {
        let c = chars[pos];
        if c.is_whitespace() {
            pos += 1;
            continue;
        }
        let start = pos;

        if c.is_alphabetic() || c == '_' {
            while pos < chars.len() && (chars[pos].is_alphanumeric() || chars[pos] == '_') {
                pos += 1;
            }
            let name: String = chars[start..pos].iter().collect();

            // `Number{unit}`
            let mut brace = pos;
            while brace < chars.len() && chars[brace].is_whitespace() {
                brace += 1;
            }
            if name == "Number" && brace < chars.len() && chars[brace] == '{' {
                let inner_start = brace + 1;
                let close = chars[inner_start..].iter().position(|&c| c == '}').map(|i| inner_start + i);
                let inner_end = close.unwrap_or(chars.len());
                let inner: String = chars[inner_start..inner_end].iter().collect();
                let unit = unit::lexer::parse_into(saver.recorder(), &inner, offset + inner_start);
                pos = match close {
                    Some(close) => close + 1,
                    None => {
                        let end = offset + chars.len();
                        saver.recorder().add_error(
                            Span::empty(end),
                            "Missing `}` before end",
                            vec![PendingFix::new("Insert `}`", Span::empty(end), "}")],
                        );
                        chars.len()
                    }
                };
                saver.save_operand(
                    TypeExpression::new(TypeKind::NumberWithUnit { unit }),
                    Span::new(offset + start, offset + pos),
                );
                continue;
            }

            saver.save_operand(TypeExpression::ident(name), Span::new(offset + start, offset + pos));
            continue;
        }

        pos += 1;
        let span = Span::new(offset + start, offset + pos);
        match c {
            ':' => saver.save_operator(TypeOp::Colon, span),
            ',' => saver.save_operator(TypeOp::Comma, span),
            '(' => saver.save_keyword(TypeBracket::OpenRound, span),
            ')' => saver.save_keyword(TypeBracket::CloseRound, span),
            '[' => saver.save_keyword(TypeBracket::OpenSquare, span),
            ']' => saver.save_keyword(TypeBracket::CloseSquare, span),
            other => {
                let text = other.to_string();
                saver
                    .recorder()
                    .add_error(span, format!("Unexpected character `{}` in type", text), Vec::new());
                saver.save_operand(TypeDomain::invalid_ident(&text), span);
            }
        }
    }

    saver.finish(offset + chars.len())
}
