//! Verification comparator
//!
//! Runs one case through extraction, chrome stripping and isolation, then
//! judges the isolated payload against the golden value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info_span, Instrument};

use crate::chrome::ChromeStripper;
use crate::config::SettleBudget;
use crate::corpus::TestCase;
use crate::extract::{CandidateSource, ExtractionChain};
use crate::script::{AllowedCharset, ScriptRange};
use crate::surface::RenderingSurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "pass"),
            Verdict::Fail => write!(f, "fail"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureReason {
    ExpectedEmptyButGotOutput,
    EmptyOutput,
    NoTargetScript,
    Mismatch,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::ExpectedEmptyButGotOutput => "expected-empty-but-got-output",
            FailureReason::EmptyOutput => "empty-output",
            FailureReason::NoTargetScript => "no-target-script",
            FailureReason::Mismatch => "mismatch",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the payload and the golden value are compared
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComparisonMode {
    /// Equal after trimming both ends
    #[default]
    Exact,
    /// Also treat every internal whitespace run as one space
    CollapseWhitespace,
}

impl ComparisonMode {
    pub fn normalize(&self, text: &str) -> String {
        match self {
            ComparisonMode::Exact => text.trim().to_string(),
            ComparisonMode::CollapseWhitespace => {
                text.split_whitespace().collect::<Vec<_>>().join(" ")
            }
        }
    }

    pub fn equal(&self, a: &str, b: &str) -> bool {
        self.normalize(a) == self.normalize(b)
    }
}

impl FromStr for ComparisonMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exact" => Ok(ComparisonMode::Exact),
            "collapse-whitespace" | "collapse" => Ok(ComparisonMode::CollapseWhitespace),
            other => Err(format!("unknown comparison mode: {}", other)),
        }
    }
}

/// Outcome of one case. Built once, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub id: String,
    pub input: String,
    pub raw_candidate: String,
    pub source: CandidateSource,
    pub cleaned_payload: String,
    pub expected: String,
    pub verdict: Verdict,
    pub reason: Option<FailureReason>,
}

impl VerificationResult {
    pub fn passed(&self) -> bool {
        self.verdict.is_pass()
    }
}

/// Intermediate texts of one pipeline run, for inspection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineStages {
    pub raw: String,
    pub source: CandidateSource,
    pub stripped: String,
    pub isolated: String,
}

/// The extraction-to-verdict pipeline
#[derive(Debug)]
pub struct Verifier {
    chain: ExtractionChain,
    stripper: ChromeStripper,
    allowed: AllowedCharset,
    script: ScriptRange,
    mode: ComparisonMode,
}

impl Verifier {
    pub fn new(script: ScriptRange, budget: SettleBudget, mode: ComparisonMode) -> Self {
        Self {
            chain: ExtractionChain::standard(script, budget.grace),
            stripper: ChromeStripper::standard().clone(),
            allowed: AllowedCharset::for_script(script),
            script,
            mode,
        }
    }

    pub fn with_chain(mut self, chain: ExtractionChain) -> Self {
        self.chain = chain;
        self
    }

    pub fn with_stripper(mut self, stripper: ChromeStripper) -> Self {
        self.stripper = stripper;
        self
    }

    pub fn mode(&self) -> ComparisonMode {
        self.mode
    }

    /// Extract, strip and isolate without judging
    pub async fn stages(&self, surface: &dyn RenderingSurface) -> PipelineStages {
        let candidate = self.chain.extract(surface).await;
        let stripped = self.stripper.strip(&candidate.value);
        let isolated = self.allowed.isolate(&stripped);
        debug!(
            source = %candidate.source,
            raw = %candidate.value,
            stripped = %stripped,
            isolated = %isolated,
            "pipeline stages"
        );
        PipelineStages {
            raw: candidate.value,
            source: candidate.source,
            stripped,
            isolated,
        }
    }

    pub async fn verify(
        &self,
        id: &str,
        input: &str,
        expected: &str,
        surface: &dyn RenderingSurface,
    ) -> VerificationResult {
        let span = info_span!("verify", case = %id);
        async {
            let stages = self.stages(surface).await;
            let outcome = self.judge(expected, &stages.isolated);
            VerificationResult {
                id: id.to_string(),
                input: input.to_string(),
                raw_candidate: stages.raw,
                source: stages.source,
                cleaned_payload: stages.isolated,
                expected: expected.to_string(),
                verdict: if outcome.is_ok() { Verdict::Pass } else { Verdict::Fail },
                reason: outcome.err(),
            }
        }
        .instrument(span)
        .await
    }

    pub async fn verify_case(
        &self,
        case: &TestCase,
        surface: &dyn RenderingSurface,
    ) -> VerificationResult {
        self.verify(&case.id, &case.input, &case.expected, surface)
            .await
    }

    /// Classify an isolated payload against the golden value
    pub fn judge(&self, expected: &str, payload: &str) -> Result<(), FailureReason> {
        let payload = payload.trim();
        if expected.is_empty() {
            return if payload.is_empty() {
                Ok(())
            } else {
                Err(FailureReason::ExpectedEmptyButGotOutput)
            };
        }
        if payload.is_empty() {
            return Err(FailureReason::EmptyOutput);
        }
        if !self.script.contains_target_script(payload) {
            return Err(FailureReason::NoTargetScript);
        }
        if !self.mode.equal(payload, expected) {
            return Err(FailureReason::Mismatch);
        }
        Ok(())
    }
}

impl Default for Verifier {
    fn default() -> Self {
        Self::new(ScriptRange::default(), SettleBudget::immediate(), ComparisonMode::Exact)
    }
}
