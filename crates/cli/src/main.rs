mod commands;
mod config;
mod input;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;

use crate::config::Config;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Which grammar each input line is parsed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum InputKind {
    Expression,
    Type,
    Unit,
}

/// Parse, check and repair cellex expressions, types and units.
#[derive(Parser)]
#[command(name = "cellex", version, about = "Parse, check and repair cellex expressions")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Log parser decisions to stderr
    #[arg(long, global = true)]
    verbose: bool,

    /// TOML file with `max_diagnostics` and a `[renames]` table
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tree and diagnostics for each input line
    Parse {
        /// Input file, or `-` for stdin
        file: PathBuf,
        /// Grammar to parse with
        #[arg(long, default_value = "expression", value_enum)]
        kind: InputKind,
    },

    /// Report diagnostics; exits 1 if any input has errors
    Check {
        /// Input file, or `-` for stdin
        file: PathBuf,
        /// Grammar to parse with
        #[arg(long, default_value = "expression", value_enum)]
        kind: InputKind,
    },

    /// Print each input in canonical form, applying configured renames
    Format {
        /// Input file, or `-` for stdin
        file: PathBuf,
        /// Grammar to parse with
        #[arg(long, default_value = "expression", value_enum)]
        kind: InputKind,
    },

    /// Apply the primary quick-fix of each diagnostic
    Fix {
        /// Input file, or `-` for stdin
        file: PathBuf,
        /// Grammar to parse with
        #[arg(long, default_value = "expression", value_enum)]
        kind: InputKind,
        /// Rewrite the file in place instead of printing the result
        #[arg(long)]
        write: bool,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match Config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(msg) => {
            report_error(&msg, cli.output, cli.quiet);
            process::exit(1);
        }
    };

    let code = match cli.command {
        Commands::Parse { file, kind } => commands::parse::cmd_parse(&file, kind, &config, cli.output, cli.quiet),
        Commands::Check { file, kind } => commands::check::cmd_check(&file, kind, &config, cli.output, cli.quiet),
        Commands::Format { file, kind } => {
            commands::format::cmd_format(&file, kind, &config, cli.output, cli.quiet)
        }
        Commands::Fix { file, kind, write } => {
            commands::fix::cmd_fix(&file, kind, write, &config, cli.output, cli.quiet)
        }
    };
    process::exit(code);
}

/// Report an error to stderr in the selected format.
pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("error: {}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
