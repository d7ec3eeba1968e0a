//! mdview CLI - render Markdown from a file or stdin.
//!
//! Provides commands for:
//! - `html`: HTML fragment
//! - `outline`: heading outline
//! - `runs`: styled rich-text runs
//! - `tree`: parsed document tree

mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{HtmlArgs, OutlineArgs, RunsArgs, TreeArgs};
use output::Output;

/// mdview - Markdown to styled text, HTML and outlines.
#[derive(Parser)]
#[command(name = "mdview", version, about)]
struct Cli {
    /// Enable verbose output (info-level logs on stderr).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an HTML fragment.
    Html(HtmlArgs),
    /// Print the heading outline.
    Outline(OutlineArgs),
    /// Print styled rich-text runs.
    Runs(RunsArgs),
    /// Print the parsed document tree.
    Tree(TreeArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Html(args) => args.execute(&output),
        Commands::Outline(args) => args.execute(&output),
        Commands::Runs(args) => args.execute(&output),
        Commands::Tree(args) => args.execute(&output),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.error(&format!("Error: {err}"));
            ExitCode::FAILURE
        }
    }
}
