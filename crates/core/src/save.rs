//! Turning trees back into text.
//!
//! Every node family has a `save(dest, renames)` method. The output for
//! [`SaveDestination::Source`] re-lexes to the same tree; the output for
//! [`SaveDestination::Display`] swaps some operators for their typographic
//! glyphs and is meant for people only.

use crate::saver::{Domain, OperatorClass};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveDestination {
    #[default]
    Source,
    Display,
}

/// Identifier replacements applied while saving.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Renames(BTreeMap<String, String>);

impl Renames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.0.insert(from.into(), to.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The name to write for `name`.
    pub fn apply<'a>(&'a self, name: &'a str) -> &'a str {
        self.0.get(name).map(String::as_str).unwrap_or(name)
    }
}

impl FromIterator<(String, String)> for Renames {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Renames(iter.into_iter().collect())
    }
}

/// Escape a text literal's content for source output.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Whether an operand of `parent` must be written in brackets to parse back
/// as the same child: only children of a rank `parent` nests go bare.
pub(crate) fn needs_brackets<D: Domain>(parent: &OperatorClass<D>, child: Option<&OperatorClass<D>>) -> bool {
    match child {
        None => false,
        Some(child) => !parent.nests_rank(child.rank),
    }
}

/// The precedence class containing `op`.
pub(crate) fn class_of<D: Domain>(op: D::Op) -> Option<&'static OperatorClass<D>> {
    D::operator_classes().iter().find(|class| class.contains(op))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renames_fall_back_to_original() {
        let mut renames = Renames::new();
        renames.insert("old", "new");
        assert_eq!(renames.apply("old"), "new");
        assert_eq!(renames.apply("other"), "other");
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(escape_text(r#"say "hi" \o/"#), r#""say \"hi\" \\o/""#);
    }

    #[test]
    fn renames_deserialize_from_a_table() {
        let renames: Renames = serde_json::from_str(r#"{"price":"cost"}"#).unwrap();
        assert_eq!(renames.apply("price"), "cost");
    }
}
