//! Live suite entry point
//!
//! Runs the corpus against the real widget. Needs Node.js, Playwright and
//! network access.
//! Run with: TRANSCHECK_LIVE=1 cargo test --package transcheck-e2e --test e2e -- --ui-checks

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use transcheck_common::config::CONFIG_FILE_NAME;
use transcheck_common::{Config, Corpus, Verifier};
use transcheck_e2e::{
    run_ui_checks, E2eResult, PlaywrightConfig, PlaywrightFactory, RunnerOptions, SuiteRunner,
    UiCheckOptions,
};

#[derive(Parser, Debug)]
#[command(name = "transcheck-e2e")]
#[command(about = "Live transliteration checks against the target page")]
struct Args {
    /// Corpus file or directory
    #[arg(short, long, default_value = "../../corpus")]
    corpus: PathBuf,

    /// Configuration file
    #[arg(long, default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    /// Run only the case with this id (repeatable)
    #[arg(long)]
    only: Vec<String>,

    /// Also run the UI behaviour checks
    #[arg(long)]
    ui_checks: bool,

    /// Browser to use (chromium, firefox, webkit)
    #[arg(long)]
    browser: Option<String>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Output directory for results
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Opt-in switch so a plain `cargo test` stays offline
const LIVE_ENV: &str = "TRANSCHECK_LIVE";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    if std::env::var_os(LIVE_ENV).is_none() {
        println!("Skipping live suite; set {}=1 to run it", LIVE_ENV);
        return;
    }

    let args = Args::parse();

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    let result = rt.block_on(async_main(args));

    match result {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

async fn async_main(args: Args) -> E2eResult<bool> {
    let mut config = Config::load(&args.config)?;
    if let Some(browser) = &args.browser {
        config.browser.kind = browser
            .parse()
            .map_err(transcheck_common::Error::InvalidConfig)?;
    }
    if args.headed {
        config.browser.headless = false;
    }
    if let Some(output) = args.output {
        config.run.output_dir = output;
    }
    config.validate()?;

    let corpus = Corpus::load(&args.corpus)?.filter(&args.only, None);

    let factory = Arc::new(PlaywrightFactory::new(PlaywrightConfig::from(&config)));
    let verifier = Verifier::new(config.script_range(), config.budget(), config.run.comparison);
    let runner = SuiteRunner::new(
        factory.clone(),
        verifier,
        RunnerOptions {
            budget: config.budget(),
            concurrency: config.run.concurrency,
            fail_fast: config.run.fail_fast,
        },
    );

    let mut report = runner.run(&corpus).await?;

    if args.ui_checks {
        let options = UiCheckOptions {
            budget: config.budget(),
            script: config.script_range(),
            clear_button_text: config.target.clear_button_text.clone(),
        };
        report = report.with_ui_checks(run_ui_checks(factory.as_ref(), &corpus, &options).await?);
    }

    let path = report.write(config.report_dir())?;
    tracing::info!("Results written to: {}", path.display());

    Ok(report.all_passed())
}
