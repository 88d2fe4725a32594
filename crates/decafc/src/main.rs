//! Decaf static analyzer
//!
//! Usage: decafc [OPTIONS] <input>

use anyhow::Context;
use clap::{Parser as ClapParser, ValueEnum};
use codespan_reporting::term::termcolor::ColorChoice;
use decaf::driver::{CheckConfig, Driver, OutputStyle};
use decaf::frontend::FrontendConfig;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// When to color diagnostics
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Default)]
enum Color {
    /// Color when writing to a terminal
    #[default]
    Auto,
    /// Always color
    Always,
    /// Never color
    Never,
}

#[derive(ClapParser, Debug)]
#[command(name = "decafc")]
#[command(author = "Decaf Tools Team")]
#[command(version)]
#[command(about = "Static semantic analyzer for Decaf", long_about = None)]
struct Args {
    /// Input source file (.decaf)
    #[arg(required = true)]
    input: PathBuf,

    /// Print one error message per line instead of annotated snippets
    #[arg(long)]
    plain: bool,

    /// Diagnostic coloring
    #[arg(long, value_enum, default_value = "auto")]
    color: Color,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Dump tokens (for debugging)
    #[arg(long)]
    dump_tokens: bool,

    /// Dump AST (for debugging)
    #[arg(long)]
    dump_ast: bool,

    /// Dump symbol tables (for debugging)
    #[arg(long)]
    dump_symbols: bool,
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("error: {:#}", e);
            process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Returns whether the input checked clean
fn run(args: &Args) -> anyhow::Result<bool> {
    let config = CheckConfig {
        frontend: FrontendConfig {
            dump_tokens: args.dump_tokens,
            dump_ast: args.dump_ast,
            dump_symbols: args.dump_symbols,
        },
        style: if args.plain { OutputStyle::Plain } else { OutputStyle::Rich },
        color: match args.color {
            Color::Auto => ColorChoice::Auto,
            Color::Always => ColorChoice::Always,
            Color::Never => ColorChoice::Never,
        },
    };

    let driver = Driver::new(config);
    let summary = driver
        .check_file(&args.input)
        .with_context(|| format!("failed to check {}", args.input.display()))?;

    if !summary.is_clean() {
        eprintln!(
            "{}: {} semantic error{}",
            summary.filename,
            summary.errors.len(),
            if summary.errors.len() == 1 { "" } else { "s" }
        );
    }

    Ok(summary.is_clean())
}
