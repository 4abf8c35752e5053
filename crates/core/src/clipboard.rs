//! Copy and paste of expressions as a map from format id to text.

use crate::expression::Expression;
use crate::parse::{parse_expression, ParseOptions, Parsed};
use crate::save::{Renames, SaveDestination};
use std::collections::BTreeMap;

pub const PLAIN_TEXT: &str = "text/plain";
pub const EXPRESSION_FORMAT: &str = "application/x-cellex-expression";

pub fn to_clipboard(expression: &Expression) -> BTreeMap<String, String> {
    let renames = Renames::new();
    BTreeMap::from([
        (
            PLAIN_TEXT.to_owned(),
            expression.save(SaveDestination::Display, &renames),
        ),
        (
            EXPRESSION_FORMAT.to_owned(),
            expression.save(SaveDestination::Source, &renames),
        ),
    ])
}

/// Parse clipboard content, preferring the expression format over plain
/// text. `None` if neither format is present.
pub fn from_clipboard(contents: &BTreeMap<String, String>, options: &ParseOptions) -> Option<Parsed<Expression>> {
    let text = contents
        .get(EXPRESSION_FORMAT)
        .or_else(|| contents.get(PLAIN_TEXT))?;
    Some(parse_expression(text, options))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_then_paste_gives_the_same_tree() {
        let parsed = parse_expression("a * b <> c", &ParseOptions::default());
        let clip = to_clipboard(&parsed.root);
        assert_eq!(clip[PLAIN_TEXT], "a × b ≠ c");
        assert_eq!(clip[EXPRESSION_FORMAT], "a * b <> c");
        let pasted = from_clipboard(&clip, &ParseOptions::default()).unwrap();
        assert!(!pasted.has_errors());
        assert_eq!(pasted.root, parsed.root);
    }

    #[test]
    fn plain_text_is_a_fallback() {
        let clip = BTreeMap::from([(PLAIN_TEXT.to_owned(), "1 ≤ 2".to_owned())]);
        let pasted = from_clipboard(&clip, &ParseOptions::default()).unwrap();
        assert!(!pasted.has_errors());
    }

    #[test]
    fn empty_clipboard_gives_nothing() {
        assert!(from_clipboard(&BTreeMap::new(), &ParseOptions::default()).is_none());
    }
}
