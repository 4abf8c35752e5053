use std::collections::HashMap;
use std::path::Path;

use cellex_core::apply_primary_fixes;
use serde::Serialize;

use super::{analyse, analyse_file, print_json, LineReport};
use crate::config::Config;
use crate::input::is_stdin;
use crate::{report_error, InputKind, OutputFormat};

#[derive(Serialize)]
struct FixReport<'a> {
    applied: usize,
    remaining: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

/// Apply the primary fix of every diagnostic, skipping fixes that overlap
/// one already applied on the same line.
pub(crate) fn cmd_fix(
    file: &Path,
    kind: InputKind,
    write: bool,
    config: &Config,
    output: OutputFormat,
    quiet: bool,
) -> i32 {
    if write && is_stdin(file) {
        report_error("--write needs a file, not stdin", output, quiet);
        return 1;
    }
    let (text, reports) = analyse_file(file, kind, config, output, quiet);
    let (fixed, applied, remaining) = fix_text(&text, &reports, kind, config);

    if write {
        if let Err(e) = std::fs::write(file, &fixed) {
            report_error(&format!("cannot write {}: {}", file.display(), e), output, quiet);
            return 1;
        }
    }

    match output {
        OutputFormat::Json => print_json(&FixReport {
            applied,
            remaining,
            text: (!write).then_some(fixed.as_str()),
        }),
        OutputFormat::Text => {
            if !write {
                print!("{}", fixed);
            }
            if !quiet {
                eprintln!("applied {} fix(es), {} error(s) remain", applied, remaining);
            }
        }
    }
    0
}

/// Rewrite each reported line with its fixes, keeping every line's own
/// terminator. Returns the new text, the number of fixes applied and the
/// errors left after re-parsing.
fn fix_text(text: &str, reports: &[LineReport], kind: InputKind, config: &Config) -> (String, usize, usize) {
    let by_line: HashMap<usize, &LineReport> = reports.iter().map(|r| (r.line, r)).collect();
    let mut applied = 0;
    let mut remaining = 0;
    let mut out = String::with_capacity(text.len());
    for (i, raw) in text.split_inclusive('\n').enumerate() {
        let line = raw.trim_end_matches('\n').trim_end_matches('\r');
        let ending = &raw[line.len()..];
        match by_line.get(&(i + 1)) {
            Some(report) if report.has_errors() => {
                let (fixed, count) = apply_primary_fixes(line, &report.diagnostics);
                applied += count;
                let again = analyse(kind, i + 1, &fixed, config);
                remaining += again.diagnostics.len() + again.truncated;
                out.push_str(&fixed);
            }
            _ => out.push_str(line),
        }
        out.push_str(ending);
    }
    (out, applied, remaining)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::inputs;

    fn run(text: &str) -> (String, usize, usize) {
        let config = Config::default();
        let reports: Vec<LineReport> = inputs(text)
            .into_iter()
            .map(|(line, input)| analyse(InputKind::Expression, line, input, &config))
            .collect();
        fix_text(text, &reports, InputKind::Expression, &config)
    }

    #[test]
    fn clean_lines_are_untouched() {
        assert_eq!(run("a+b\n\n(1\n"), ("a+b\n\n(1)\n".to_owned(), 1, 0));
    }

    #[test]
    fn mixed_operators_take_the_first_bracketing() {
        let (fixed, applied, remaining) = run("a & b + c & d");
        assert_eq!(applied, 1);
        assert_eq!(remaining, 0);
        assert_eq!(fixed, "a & (b + c) & d");
    }

    #[test]
    fn crlf_line_endings_survive() {
        assert_eq!(run("(1\r\nx\r\n"), ("(1)\r\nx\r\n".to_owned(), 1, 0));
        assert_eq!(run("a\r\n(b"), ("a\r\n(b)".to_owned(), 1, 0));
    }
}
