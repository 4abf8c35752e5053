use std::path::Path;

use cellex_core::Diagnostic;
use serde::Serialize;

use super::{analyse_file, format_diagnostics, label, print_json};
use crate::config::Config;
use crate::{InputKind, OutputFormat};

#[derive(Serialize)]
struct CheckReport<'a> {
    inputs: usize,
    errors: usize,
    failures: Vec<Failure<'a>>,
}

#[derive(Serialize)]
struct Failure<'a> {
    line: usize,
    diagnostics: &'a [Diagnostic],
    truncated: usize,
}

/// Report every diagnostic; exit 1 if there were any.
pub(crate) fn cmd_check(file: &Path, kind: InputKind, config: &Config, output: OutputFormat, quiet: bool) -> i32 {
    let (_, reports) = analyse_file(file, kind, config, output, quiet);

    let failures: Vec<Failure> = reports
        .iter()
        .filter(|r| r.has_errors())
        .map(|r| Failure {
            line: r.line,
            diagnostics: &r.diagnostics,
            truncated: r.truncated,
        })
        .collect();
    let errors: usize = failures.iter().map(|f| f.diagnostics.len() + f.truncated).sum();

    match output {
        OutputFormat::Json => print_json(&CheckReport {
            inputs: reports.len(),
            errors,
            failures,
        }),
        OutputFormat::Text => {
            let label = label(file);
            for report in reports.iter().filter(|r| r.has_errors()) {
                for line in format_diagnostics(&label, report) {
                    println!("{}", line);
                }
            }
            if !quiet {
                if errors == 0 {
                    println!("ok: {} input(s), no errors", reports.len());
                } else {
                    println!("{} error(s) in {} input(s)", errors, reports.len());
                }
            }
        }
    }

    if errors == 0 {
        0
    } else {
        1
    }
}
