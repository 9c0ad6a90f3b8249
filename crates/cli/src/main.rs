//! transcheck CLI - Main Entry Point
//!
//! Runs transliteration corpora against the live widget, validates corpora,
//! replays the output pipeline over captured pages and shows saved reports.

use clap::{Parser, Subcommand};

use transcheck_cli::commands::{corpus, inspect, report, run};
use transcheck_cli::{output, Outcome, FATAL_EXIT_CODE};

/// transcheck - Singlish to Sinhala transliteration verifier
#[derive(Parser)]
#[command(name = "transcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a corpus against the live page
    Run(run::RunArgs),

    /// Validate corpora
    #[command(subcommand)]
    Corpus(corpus::CorpusCommands),

    /// Run the output pipeline over a captured page
    Inspect(inspect::InspectArgs),

    /// Saved reports
    #[command(subcommand)]
    Report(report::ReportCommands),

    /// Show version information
    Version,
}

async fn dispatch(cli: Cli) -> anyhow::Result<Outcome> {
    match cli.command {
        Commands::Run(args) => run::execute(args, cli.format).await,
        Commands::Corpus(cmd) => corpus::execute(cmd, cli.format).await,
        Commands::Inspect(args) => inspect::execute(args, cli.format).await,
        Commands::Report(cmd) => report::execute(cmd, cli.format).await,
        Commands::Version => {
            println!("transcheck v{}", transcheck_common::VERSION);
            Ok(Outcome::Passed)
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    match dispatch(cli).await {
        Ok(outcome) => std::process::exit(outcome.exit_code()),
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            std::process::exit(FATAL_EXIT_CODE);
        }
    }
}
