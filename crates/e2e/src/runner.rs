//! Suite runner: one session per case, results in corpus order

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, warn};
use transcheck_common::{
    Corpus, SettleBudget, SuiteReport, TestCase, VerificationResult, Verifier,
};

use crate::error::E2eResult;
use crate::session::SessionFactory;

/// Runner knobs that are not part of the verification pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerOptions {
    pub budget: SettleBudget,
    pub concurrency: usize,
    pub fail_fast: bool,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            budget: SettleBudget::default(),
            concurrency: 1,
            fail_fast: false,
        }
    }
}

pub struct SuiteRunner {
    factory: Arc<dyn SessionFactory>,
    verifier: Arc<Verifier>,
    options: RunnerOptions,
}

impl SuiteRunner {
    pub fn new(factory: Arc<dyn SessionFactory>, verifier: Verifier, options: RunnerOptions) -> Self {
        Self {
            factory,
            verifier: Arc::new(verifier),
            options,
        }
    }

    pub fn factory(&self) -> &Arc<dyn SessionFactory> {
        &self.factory
    }

    pub fn verifier(&self) -> &Verifier {
        &self.verifier
    }

    pub fn options(&self) -> &RunnerOptions {
        &self.options
    }

    /// Run every case of `corpus`.
    ///
    /// Fails only on fatal errors: the preflight, or a session that cannot be
    /// opened or filled. Case failures land in the report.
    pub async fn run(&self, corpus: &Corpus) -> E2eResult<SuiteReport> {
        self.factory.preflight().await?;

        let started_at = Utc::now();
        let stop = AtomicBool::new(false);
        let concurrency = self.options.concurrency.max(1);

        info!("Running {} case(s) against {}...", corpus.len(), self.factory.target());

        let mut outcomes = stream::iter(corpus.cases.iter())
            .map(|case| {
                let stop = &stop;
                async move {
                    if stop.load(Ordering::SeqCst) {
                        debug!("Skipping {} after earlier failure", case.id);
                        return Ok(None);
                    }
                    self.run_case(case).await.map(Some)
                }
            })
            .buffered(concurrency);

        let mut results = Vec::with_capacity(corpus.len());
        let mut skipped = 0;
        while let Some(outcome) = outcomes.next().await {
            match outcome? {
                Some(result) => {
                    if !result.passed() && self.options.fail_fast {
                        stop.store(true, Ordering::SeqCst);
                    }
                    results.push(result);
                }
                None => skipped += 1,
            }
        }

        let report = SuiteReport::new(
            self.factory.target(),
            started_at,
            Utc::now(),
            results,
            skipped,
        );

        info!("");
        info!(
            "Test Results: {} passed, {} failed, {} skipped ({} ms)",
            report.passed, report.failed, report.skipped, report.duration_ms
        );

        Ok(report)
    }

    /// Open a session, type the phrase, wait, verify, close
    pub async fn run_case(&self, case: &TestCase) -> E2eResult<VerificationResult> {
        let session = self.factory.open().await?;
        session.fill_input(&case.input).await?;
        session.settle(self.options.budget.settle).await?;

        let result = self.verifier.verify_case(case, session.surface()).await;

        if let Err(e) = session.close().await {
            warn!("Closing session for {} failed: {}", case.id, e);
        }

        log_verdict(case, &result);
        Ok(result)
    }
}

fn log_verdict(case: &TestCase, result: &VerificationResult) {
    if result.passed() {
        info!("✓ {}", case.title());
    } else {
        let reason = result
            .reason
            .map(|r| r.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        error!("✗ {} - {}", case.id, reason);
        debug!(
            "  raw: {:?} cleaned: {:?} expected: {:?}",
            result.raw_candidate, result.cleaned_payload, result.expected
        );
    }
}
