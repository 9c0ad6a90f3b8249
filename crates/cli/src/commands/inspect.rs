//! Offline pipeline inspection of a captured page

use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use serde::Serialize;
use transcheck_common::config::CONFIG_FILE_NAME;
use transcheck_common::verify::PipelineStages;
use transcheck_common::{
    ComparisonMode, Config, FailureReason, SettleBudget, SnapshotSurface, SurfaceSnapshot,
    Verifier,
};

use crate::output::{self, Field, OutputFormat};
use crate::Outcome;

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Captured page as JSON (`{"controls": [...], "regions": [...]}`)
    #[arg(long)]
    pub snapshot: PathBuf,

    /// Golden value to judge against
    #[arg(long)]
    pub expected: Option<String>,

    /// Phrase that was typed, echoed in the output
    #[arg(long, default_value = "")]
    pub input: String,

    /// Configuration file, for the script range and comparison mode
    #[arg(long, default_value = CONFIG_FILE_NAME)]
    pub config: PathBuf,

    /// Comparison mode override
    #[arg(long)]
    pub comparison: Option<ComparisonMode>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Inspection {
    script: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    input: String,
    stages: PipelineStages,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    passed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<FailureReason>,
}

async fn inspect(args: &InspectArgs) -> anyhow::Result<Inspection> {
    let config = Config::load(&args.config)?;
    let mode = args.comparison.unwrap_or(config.run.comparison);
    let verifier = Verifier::new(config.script_range(), SettleBudget::immediate(), mode);

    let surface = SnapshotSurface::new(SurfaceSnapshot::from_file(&args.snapshot)?);
    let stages = verifier.stages(&surface).await;

    let judged = args
        .expected
        .as_deref()
        .map(|expected| verifier.judge(expected, &stages.isolated));

    Ok(Inspection {
        passed: judged.as_ref().map(|r| r.is_ok()),
        reason: judged.and_then(|r| r.err()),
        expected: args.expected.clone(),
        input: args.input.clone(),
        script: config.script.label(),
        stages,
    })
}

pub async fn execute(args: InspectArgs, format: OutputFormat) -> anyhow::Result<Outcome> {
    let inspection = inspect(&args).await?;

    if matches!(format, OutputFormat::Json | OutputFormat::Yaml) {
        output::print_serialized(&inspection, format);
    } else {
        let mut fields = vec![Field::new("script", &inspection.script)];
        if !inspection.input.is_empty() {
            fields.push(Field::new("input", format!("{:?}", inspection.input)));
        }
        fields.extend(output::stage_fields(&inspection.stages));
        if let Some(expected) = &inspection.expected {
            fields.push(Field::new("expected", format!("{:?}", expected)));
        }
        output::print_list(&fields, format);

        match (inspection.passed, inspection.reason) {
            (Some(true), _) => println!("{}", "✓ PASS".green().bold()),
            (Some(false), reason) => println!(
                "{} {}",
                "✗ FAIL".red().bold(),
                reason.map(|r| r.to_string()).unwrap_or_default()
            ),
            (None, _) => {}
        }
    }

    Ok(Outcome::from_passed(inspection.passed.unwrap_or(true)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use transcheck_common::CandidateSource;

    fn args(dir: &TempDir, snapshot: &str, expected: Option<&str>) -> InspectArgs {
        let path = dir.path().join("page.json");
        std::fs::write(&path, snapshot).unwrap();
        InspectArgs {
            snapshot: path,
            expected: expected.map(String::from),
            input: String::new(),
            config: dir.path().join(CONFIG_FILE_NAME),
            comparison: None,
        }
    }

    #[tokio::test]
    async fn test_inspect_region_fallback_passes() {
        let dir = TempDir::new().unwrap();
        let args = args(
            &dir,
            r#"{"controls": ["mama yanavaa"], "regions": ["Sinhala\nමම යනවා\nClear"]}"#,
            Some("මම යනවා"),
        );

        let inspection = inspect(&args).await.unwrap();
        assert_eq!(inspection.stages.source, CandidateSource::Region);
        assert_eq!(inspection.stages.isolated, "මම යනවා");
        assert_eq!(inspection.passed, Some(true));
        assert_eq!(inspection.reason, None);
    }

    #[tokio::test]
    async fn test_inspect_reports_reason() {
        let dir = TempDir::new().unwrap();
        let args = args(&dir, r#"{"controls": ["hello", "hello"]}"#, Some("හෙලෝ"));

        let inspection = inspect(&args).await.unwrap();
        assert_eq!(inspection.passed, Some(false));
        assert_eq!(inspection.reason, Some(FailureReason::NoTargetScript));
    }

    #[tokio::test]
    async fn test_inspect_without_expected_only_shows_stages() {
        let dir = TempDir::new().unwrap();
        let args = args(&dir, r#"{"controls": ["a", "Clear අපි"]}"#, None);

        let inspection = inspect(&args).await.unwrap();
        assert_eq!(inspection.stages.stripped, "අපි");
        assert_eq!(inspection.passed, None);
    }

    #[tokio::test]
    async fn test_inspect_names_configured_script() {
        let dir = TempDir::new().unwrap();
        let args = args(&dir, r#"{"controls": ["a", "அம்மா"]}"#, Some("அம்மா"));
        std::fs::write(
            &args.config,
            "[script]\nname = \"Tamil\"\nfirst = 0x0B80\nlast = 0x0BFF\n",
        )
        .unwrap();

        let inspection = inspect(&args).await.unwrap();
        assert_eq!(inspection.script, "Tamil (U+0B80..U+0BFF)");
        assert_eq!(inspection.passed, Some(true));
    }
}
