use std::path::Path;

use super::{analyse_file, format_diagnostics, label, print_json};
use crate::config::Config;
use crate::{InputKind, OutputFormat};

/// Print each input's tree and diagnostics. Parsing never fails, so this
/// only exits non-zero when the input cannot be read.
pub(crate) fn cmd_parse(file: &Path, kind: InputKind, config: &Config, output: OutputFormat, quiet: bool) -> i32 {
    let (_, reports) = analyse_file(file, kind, config, output, quiet);

    match output {
        OutputFormat::Json => print_json(&reports),
        OutputFormat::Text => {
            let label = label(file);
            for report in &reports {
                println!("{}: {}", report.line, report.display);
                if !quiet {
                    let tree = serde_json::to_string_pretty(&report.tree).unwrap_or_default();
                    for line in tree.lines() {
                        println!("    {}", line);
                    }
                }
                for line in format_diagnostics(&label, report) {
                    println!("{}", line);
                }
            }
        }
    }
    0
}
