//! Extraction strategy chain
//!
//! Strategies are tried in order and the first one that yields a candidate
//! wins. Surface errors never escape the chain: they are logged and the next
//! strategy gets its turn. When every strategy comes up empty the chain
//! returns an empty candidate tagged [`CandidateSource::None`].

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::script::ScriptRange;
use crate::surface::{RenderingSurface, SurfaceResult, TextPredicate};

/// Where a candidate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateSource {
    Control,
    Region,
    None,
}

impl fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateSource::Control => write!(f, "control"),
            CandidateSource::Region => write!(f, "region"),
            CandidateSource::None => write!(f, "none"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionCandidate {
    pub value: String,
    pub source: CandidateSource,
}

impl ExtractionCandidate {
    pub fn new(value: impl Into<String>, source: CandidateSource) -> Self {
        Self {
            value: value.into(),
            source,
        }
    }

    pub fn none() -> Self {
        Self::new(String::new(), CandidateSource::None)
    }

    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }
}

/// One way of pulling the translated text off a surface
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(None)` means the strategy ran but found nothing usable
    async fn extract(
        &self,
        surface: &dyn RenderingSurface,
    ) -> SurfaceResult<Option<ExtractionCandidate>>;
}

/// Index of the output field; index 0 is the phrase input
pub const OUTPUT_CONTROL_INDEX: usize = 1;

/// Reads the widget's output field
#[derive(Debug, Clone)]
pub struct OutputControlStrategy {
    index: usize,
}

impl OutputControlStrategy {
    pub fn new(index: usize) -> Self {
        Self { index }
    }
}

impl Default for OutputControlStrategy {
    fn default() -> Self {
        Self::new(OUTPUT_CONTROL_INDEX)
    }
}

#[async_trait]
impl ExtractionStrategy for OutputControlStrategy {
    fn name(&self) -> &'static str {
        "output-control"
    }

    async fn extract(
        &self,
        surface: &dyn RenderingSurface,
    ) -> SurfaceResult<Option<ExtractionCandidate>> {
        let value = surface.read_control_value(self.index).await?;
        if value.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(ExtractionCandidate::new(value, CandidateSource::Control)))
    }
}

/// Falls back to the last display region showing target-script text.
///
/// Waits the grace interval first so late renders can land. Suggestion
/// popups put their entries on separate lines ahead of the committed text,
/// so only the last line carrying the script is kept.
#[derive(Debug, Clone)]
pub struct RegionFallbackStrategy {
    script: ScriptRange,
    predicate: TextPredicate,
    grace: Duration,
}

impl RegionFallbackStrategy {
    pub fn new(script: ScriptRange, grace: Duration) -> Self {
        Self {
            script,
            predicate: TextPredicate::target_script(script),
            grace,
        }
    }

    pub fn predicate(&self) -> &TextPredicate {
        &self.predicate
    }

    /// Last line of `text` carrying the script, else the whole text.
    /// Returned as rendered; the stripper trims.
    pub fn pick_line(&self, text: &str) -> String {
        text.lines()
            .rev()
            .find(|line| self.script.contains_target_script(line))
            .unwrap_or(text)
            .to_string()
    }
}

#[async_trait]
impl ExtractionStrategy for RegionFallbackStrategy {
    fn name(&self) -> &'static str {
        "region-fallback"
    }

    async fn extract(
        &self,
        surface: &dyn RenderingSurface,
    ) -> SurfaceResult<Option<ExtractionCandidate>> {
        if !self.grace.is_zero() {
            tokio::time::sleep(self.grace).await;
        }

        let text = surface.read_region_text(&self.predicate).await?;
        let value = self.pick_line(&text);
        if value.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(ExtractionCandidate::new(value, CandidateSource::Region)))
    }
}

/// Ordered strategies, first success wins
pub struct ExtractionChain {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl ExtractionChain {
    pub fn new(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Output control first, then the region fallback after `grace`
    pub fn standard(script: ScriptRange, grace: Duration) -> Self {
        Self::new(vec![
            Box::new(OutputControlStrategy::default()),
            Box::new(RegionFallbackStrategy::new(script, grace)),
        ])
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub async fn extract(&self, surface: &dyn RenderingSurface) -> ExtractionCandidate {
        for strategy in &self.strategies {
            match strategy.extract(surface).await {
                Ok(Some(candidate)) => {
                    debug!(strategy = strategy.name(), source = %candidate.source, "candidate extracted");
                    return candidate;
                }
                Ok(None) => {
                    debug!(strategy = strategy.name(), "strategy found nothing");
                }
                Err(e) => {
                    debug!(strategy = strategy.name(), error = %e, "strategy failed");
                }
            }
        }
        ExtractionCandidate::none()
    }
}

impl fmt::Debug for ExtractionChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionChain")
            .field("strategies", &self.strategy_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::SINHALA;
    use crate::surface::{SnapshotSurface, SurfaceSnapshot};

    fn chain() -> ExtractionChain {
        ExtractionChain::standard(SINHALA, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_primary_wins_without_region_read() {
        let surface = SnapshotSurface::new(SurfaceSnapshot {
            controls: vec!["mama yanavaa".into(), "  මම යනවා ".into()],
            regions: vec!["අපි".into()],
        });

        let candidate = chain().extract(&surface).await;

        assert_eq!(candidate, ExtractionCandidate::new("  මම යනවා ", CandidateSource::Control));
        assert_eq!(surface.control_reads(), 1);
        assert_eq!(surface.region_reads(), 0);
    }

    #[tokio::test]
    async fn test_fallback_takes_last_script_line() {
        let surface = SnapshotSurface::with_regions([
            "header",
            "candidate-suggestion-1\nමම වෙනවා\nමම යනවා",
        ]);

        let candidate = chain().extract(&surface).await;

        assert_eq!(candidate, ExtractionCandidate::new("මම යනවා", CandidateSource::Region));
        assert_eq!(surface.region_reads(), 1);
    }

    #[tokio::test]
    async fn test_fallback_after_blank_output_control() {
        let surface = SnapshotSurface::new(SurfaceSnapshot {
            controls: vec!["kohomadha".into(), "   ".into()],
            regions: vec!["කොහොමද".into()],
        });

        let candidate = chain().extract(&surface).await;

        assert_eq!(candidate.source, CandidateSource::Region);
        assert_eq!(candidate.value, "කොහොමද");
    }

    #[tokio::test]
    async fn test_total_failure_yields_none() {
        let surface = SnapshotSurface::new(SurfaceSnapshot {
            controls: vec!["only input".into()],
            regions: vec!["Translate".into(), "Clear".into()],
        });
        assert_eq!(chain().extract(&surface).await, ExtractionCandidate::none());

        let broken = SnapshotSurface::unavailable();
        assert_eq!(chain().extract(&broken).await, ExtractionCandidate::none());
        assert_eq!(broken.control_reads(), 1);
        assert_eq!(broken.region_reads(), 1);
    }

    #[test]
    fn test_pick_line_without_script_line_keeps_text() {
        let strategy = RegionFallbackStrategy::new(SINHALA, Duration::ZERO);
        assert_eq!(strategy.pick_line(" plain text "), " plain text ");
        assert_eq!(strategy.pick_line("a\n අ b\nc"), " අ b");
    }

    #[tokio::test]
    async fn test_grace_wait_before_region_read() {
        let surface = SnapshotSurface::with_regions(["අපි"]);
        let chain = ExtractionChain::standard(SINHALA, Duration::from_millis(50));

        let started = std::time::Instant::now();
        let candidate = chain.extract(&surface).await;

        assert_eq!(candidate.value, "අපි");
        assert!(started.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_candidate_keeps_surrounding_whitespace() {
        let surface = SnapshotSurface::with_regions(["suggestion\n  අපි යමු \nfooter"]);
        let candidate = chain().extract(&surface).await;
        assert_eq!(candidate.value, "  අපි යමු ");
        assert_eq!(candidate.source, CandidateSource::Region);
    }

    #[test]
    fn test_strategy_order() {
        assert_eq!(chain().strategy_names(), vec!["output-control", "region-fallback"]);
    }
}
