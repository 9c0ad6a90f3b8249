//! Live corpus run

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use tracing::info;
use transcheck_common::config::{BrowserKind, CONFIG_FILE_NAME};
use transcheck_common::{Category, ComparisonMode, Config, Corpus, Verifier};
use transcheck_e2e::{
    run_ui_checks, PlaywrightConfig, PlaywrightFactory, RunnerOptions, SuiteRunner,
    UiCheckOptions,
};

use crate::output::{self, OutputFormat};
use crate::Outcome;

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Corpus file or directory
    #[arg(long, env = "TRANSCHECK_CORPUS", default_value = "corpus")]
    pub corpus: PathBuf,

    /// Configuration file
    #[arg(long, env = "TRANSCHECK_CONFIG", default_value = CONFIG_FILE_NAME)]
    pub config: PathBuf,

    /// Run only the case with this id (repeatable)
    #[arg(long)]
    pub only: Vec<String>,

    /// Run only positive or negative cases
    #[arg(long)]
    pub category: Option<Category>,

    /// Also run the UI behaviour checks
    #[arg(long)]
    pub ui_checks: bool,

    /// Target page URL
    #[arg(long, env = "TRANSCHECK_URL")]
    pub url: Option<String>,

    /// Browser engine (chromium, firefox, webkit)
    #[arg(long, env = "TRANSCHECK_BROWSER")]
    pub browser: Option<BrowserKind>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Cases in flight at once
    #[arg(long, env = "TRANSCHECK_CONCURRENCY")]
    pub concurrency: Option<usize>,

    /// Wait after typing, in milliseconds
    #[arg(long, env = "TRANSCHECK_SETTLE_MS")]
    pub settle_ms: Option<u64>,

    /// Wait before the region fallback, in milliseconds
    #[arg(long, env = "TRANSCHECK_GRACE_MS")]
    pub grace_ms: Option<u64>,

    /// Comparison mode (exact, collapse-whitespace)
    #[arg(long, env = "TRANSCHECK_COMPARISON")]
    pub comparison: Option<ComparisonMode>,

    /// Stop after the first failing case
    #[arg(long)]
    pub fail_fast: bool,

    /// Output directory for the report
    #[arg(short, long, env = "TRANSCHECK_OUTPUT")]
    pub output: Option<PathBuf>,
}

impl RunArgs {
    /// Load the config file and apply flag overrides
    pub fn resolve_config(&self) -> anyhow::Result<Config> {
        let mut config = Config::load(&self.config)?;

        if let Some(url) = &self.url {
            config.target.url = url.clone();
        }
        if let Some(browser) = self.browser {
            config.browser.kind = browser;
        }
        if self.headed {
            config.browser.headless = false;
        }
        if let Some(concurrency) = self.concurrency {
            config.run.concurrency = concurrency;
        }
        if let Some(settle_ms) = self.settle_ms {
            config.timing.settle_ms = settle_ms;
        }
        if let Some(grace_ms) = self.grace_ms {
            config.timing.grace_ms = grace_ms;
        }
        if let Some(comparison) = self.comparison {
            config.run.comparison = comparison;
        }
        if self.fail_fast {
            config.run.fail_fast = true;
        }
        if let Some(output) = &self.output {
            config.run.output_dir = output.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

pub async fn execute(args: RunArgs, format: OutputFormat) -> anyhow::Result<Outcome> {
    let config = args.resolve_config()?;
    let corpus = Corpus::load(&args.corpus)?.filter(&args.only, args.category);
    if corpus.is_empty() {
        output::print_warning("No cases selected");
    }

    info!("Target script: {}", config.script.label());

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
        let checks = run_ui_checks(factory.as_ref(), &corpus, &options).await?;
        report = report.with_ui_checks(checks);
    }

    let path = report.write(config.report_dir())?;
    info!("Results written to: {}", path.display());

    output::print_report(&report, format);
    Ok(Outcome::from_passed(report.all_passed()))
}
