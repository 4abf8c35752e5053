use std::path::Path;

use serde::Serialize;

use super::{analyse_file, format_diagnostics, label, print_json};
use crate::config::Config;
use crate::{report_error, InputKind, OutputFormat};

#[derive(Serialize)]
struct Formatted<'a> {
    line: usize,
    source: &'a str,
}

/// Print canonical source for every input. Refuses when any input has
/// errors, since saving an invalid tree only echoes its tokens back.
pub(crate) fn cmd_format(file: &Path, kind: InputKind, config: &Config, output: OutputFormat, quiet: bool) -> i32 {
    let (_, reports) = analyse_file(file, kind, config, output, quiet);

    let broken: Vec<_> = reports.iter().filter(|r| r.has_errors()).collect();
    if !broken.is_empty() {
        if !quiet && output == OutputFormat::Text {
            let label = label(file);
            for report in &broken {
                for line in format_diagnostics(&label, report) {
                    eprintln!("{}", line);
                }
            }
        }
        report_error(
            &format!("not formatting: {} input(s) have errors", broken.len()),
            output,
            quiet,
        );
        return 1;
    }

    match output {
        OutputFormat::Json => {
            let formatted: Vec<Formatted> = reports
                .iter()
                .map(|r| Formatted {
                    line: r.line,
                    source: &r.source,
                })
                .collect();
            print_json(&formatted);
        }
        OutputFormat::Text => {
            for report in &reports {
                println!("{}", report.source);
            }
        }
    }
    0
}
