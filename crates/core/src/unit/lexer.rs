use super::{UnitBracket, UnitDomain, UnitExpression, UnitOp};
use crate::recorder::LocationRecorder;
use crate::saver::{Domain, Saver};
use crate::span::Span;

/// Lex and build the unit in `text`, which starts at char offset `offset`
/// of the document being edited.
pub fn parse_into(recorder: &mut LocationRecorder, text: &str, offset: usize) -> UnitExpression {
    let chars: Vec<char> = text.chars().collect();
    let mut saver = Saver::<UnitDomain>::starting_at(recorder, offset);
    let mut pos = 0usize;

    while pos < chars.len() {
        let c = chars[pos];
        if c.is_whitespace() {
            pos += 1;
            continue;
        }
        let start = pos;

        // Integer factor or power
        if c.is_ascii_digit() {
            while pos < chars.len() && chars[pos].is_ascii_digit() {
                pos += 1;
            }
            let digits: String = chars[start..pos].iter().collect();
            let span = Span::new(offset + start, offset + pos);
            match digits.parse::<i64>() {
                Ok(value) => saver.save_operand(UnitExpression::scalar(value), span),
                Err(_) => {
                    saver
                        .recorder()
                        .add_error(span, format!("Number `{}` is too large", digits), Vec::new());
                    saver.save_operand(UnitDomain::invalid_ident(&digits), span);
                }
            }
            continue;
        }

        // Unit name
        if c.is_alphabetic() || c == '_' || c == '$' || c == '%' {
            pos += 1;
            while pos < chars.len() && (chars[pos].is_alphabetic() || chars[pos] == '_') {
                pos += 1;
            }
            let name: String = chars[start..pos].iter().collect();
            saver.save_operand(UnitExpression::name(name), Span::new(offset + start, offset + pos));
            continue;
        }

        pos += 1;
        let span = Span::new(offset + start, offset + pos);
        match c {
            '*' | '×' => saver.save_operator(UnitOp::Times, span),
            '/' => saver.save_operator(UnitOp::Divide, span),
            '^' => saver.save_operator(UnitOp::Raise, span),
            '-' => saver.save_operator(UnitOp::Minus, span),
            '(' => saver.save_keyword(UnitBracket::Open, span),
            ')' => saver.save_keyword(UnitBracket::Close, span),
            other => {
                let text = other.to_string();
                saver
                    .recorder()
                    .add_error(span, format!("Unexpected character `{}` in unit", text), Vec::new());
                saver.save_operand(UnitDomain::invalid_ident(&text), span);
            }
        }
    }

    saver.finish(offset + chars.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Identified, NodeKind};
    use crate::save::SaveDestination;
    use crate::unit::UnitKind;

    fn parse(text: &str) -> (UnitExpression, LocationRecorder) {
        let mut rec = LocationRecorder::new();
        let unit = parse_into(&mut rec, text, 0);
        (unit, rec)
    }

    #[test]
    fn compound_unit_round_trips() {
        let (unit, mut rec) = parse("kg * m / s ^ 2");
        assert!(rec.diagnostics().is_empty());
        assert_eq!(unit.save(SaveDestination::Source), "kg*m/s^2");
        assert!(matches!(unit.kind, UnitKind::Divide { .. }));
    }

    #[test]
    fn negative_power_is_absorbed() {
        let (unit, mut rec) = parse("s^-1");
        assert!(rec.diagnostics().is_empty());
        assert_eq!(unit.save(SaveDestination::Source), "s^-1");
    }

    #[test]
    fn chained_divide_needs_brackets() {
        let (unit, mut rec) = parse("m/s/s");
        let diags = rec.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "Mixed operators: brackets required");
        let fixes: Vec<&str> = diags[0].quickfixes.iter().map(|f| f.replacement.as_str()).collect();
        assert_eq!(fixes, vec!["(m/s)/s", "m/(s/s)"]);
        assert!(unit.is_invalid());
    }

    #[test]
    fn fractional_power_is_refused() {
        let (_, mut rec) = parse("m^kg");
        let diags = rec.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "Unit powers must be whole numbers");
    }

    #[test]
    fn binary_minus_is_not_a_unit_operator() {
        let (unit, mut rec) = parse("m-s");
        let diags = rec.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "Operator `-` cannot be used in a unit");
        assert_eq!(unit.save(SaveDestination::Source), "m - s");
    }

    #[test]
    fn spans_are_offset_into_the_document() {
        let (unit, mut rec) = {
            let mut rec = LocationRecorder::new();
            let unit = parse_into(&mut rec, "m", 7);
            (unit, rec)
        };
        assert!(rec.diagnostics().is_empty());
        assert_eq!(rec.span_of(NodeKind::Unit, unit.id()), Ok(Span::new(7, 8)));
    }
}
