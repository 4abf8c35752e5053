pub(crate) mod check;
pub(crate) mod fix;
pub(crate) mod format;
pub(crate) mod parse;

use std::path::Path;
use std::process;

use cellex_core::{parse_expression, parse_type, parse_unit, Diagnostic, SaveDestination};
use serde::Serialize;

use crate::config::Config;
use crate::input::{inputs, is_stdin, read_input};
use crate::{report_error, InputKind, OutputFormat};

/// Everything the commands need to know about one parsed input line.
#[derive(Debug, Serialize)]
pub(crate) struct LineReport {
    pub line: usize,
    pub input: String,
    /// Canonical source text, with renames applied.
    pub source: String,
    /// The same tree rendered for display.
    #[serde(skip)]
    pub display: String,
    pub tree: serde_json::Value,
    pub diagnostics: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "is_zero")]
    pub truncated: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl LineReport {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty() || self.truncated > 0
    }
}

/// Parse one line with the grammar for `kind`.
pub(crate) fn analyse(kind: InputKind, line: usize, text: &str, config: &Config) -> LineReport {
    let options = config.options();
    let renames = &config.renames;
    let (source, display, tree, diagnostics, truncated) = match kind {
        InputKind::Expression => {
            let parsed = parse_expression(text, &options);
            (
                parsed.root.save(SaveDestination::Source, renames),
                parsed.root.save(SaveDestination::Display, renames),
                serde_json::to_value(&parsed.root),
                parsed.diagnostics,
                parsed.truncated,
            )
        }
        InputKind::Type => {
            let parsed = parse_type(text, &options);
            (
                parsed.root.save(SaveDestination::Source, renames),
                parsed.root.save(SaveDestination::Display, renames),
                serde_json::to_value(&parsed.root),
                parsed.diagnostics,
                parsed.truncated,
            )
        }
        InputKind::Unit => {
            let parsed = parse_unit(text, &options);
            (
                parsed.root.save(SaveDestination::Source),
                parsed.root.save(SaveDestination::Display),
                serde_json::to_value(&parsed.root),
                parsed.diagnostics,
                parsed.truncated,
            )
        }
    };
    LineReport {
        line,
        input: text.to_owned(),
        source,
        display,
        tree: tree.unwrap_or(serde_json::Value::Null),
        diagnostics,
        truncated,
    }
}

/// Read `file` and parse every non-blank line. Exits on read failure.
pub(crate) fn analyse_file(
    file: &Path,
    kind: InputKind,
    config: &Config,
    output: OutputFormat,
    quiet: bool,
) -> (String, Vec<LineReport>) {
    let text = match read_input(file) {
        Ok(t) => t,
        Err(msg) => {
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };
    let reports = inputs(&text)
        .into_iter()
        .map(|(line, input)| analyse(kind, line, input, config))
        .collect();
    (text, reports)
}

/// How diagnostics name the input.
pub(crate) fn label(file: &Path) -> String {
    if is_stdin(file) {
        "<stdin>".to_owned()
    } else {
        file.display().to_string()
    }
}

/// `file:line:column: message`, one fix title per following line.
pub(crate) fn format_diagnostics(label: &str, report: &LineReport) -> Vec<String> {
    let mut out = Vec::new();
    for d in &report.diagnostics {
        out.push(format!(
            "{}:{}:{}: {}",
            label,
            report.line,
            d.location.start + 1,
            d.message
        ));
        for fix in &d.quickfixes {
            out.push(format!("    fix: {}", fix.title));
        }
    }
    if report.truncated > 0 {
        out.push(format!(
            "{}:{}: {} more diagnostic(s) not shown",
            label, report.line, report.truncated
        ));
    }
    out
}

pub(crate) fn print_json(value: &impl Serialize) {
    let json = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e));
    println!("{}", json);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_carry_line_and_column() {
        let report = analyse(InputKind::Expression, 3, "(1 + 2", &Config::default());
        assert!(report.has_errors());
        let lines = format_diagnostics("f.cx", &report);
        assert_eq!(lines[0], "f.cx:3:7: Missing `)` before end");
        assert_eq!(lines[1], "    fix: Insert `)`");
    }

    #[test]
    fn renames_reach_the_source_text() {
        let mut config = Config::default();
        config.renames.insert("qty", "quantity");
        let report = analyse(InputKind::Expression, 1, "qty * 2", &config);
        assert_eq!(report.source, "quantity * 2");
        assert_eq!(report.display, "quantity × 2");
    }

    #[test]
    fn units_are_parsed_with_the_unit_grammar() {
        let report = analyse(InputKind::Unit, 1, "kg * m", &Config::default());
        assert!(!report.has_errors());
        assert_eq!(report.source, "kg*m");
        assert_eq!(report.tree["node"], "times");
    }
}
