//! Output formatting for CLI

use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use transcheck_common::report::FailureEntry;
use transcheck_common::verify::PipelineStages;
use transcheck_common::{SuiteReport, UiCheckResult, UiOutcome};

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
    /// Plain text format
    Plain,
}

/// Trait for items that can be displayed in a table
pub trait TableDisplay {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

impl TableDisplay for FailureEntry {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Reason", "Source", "Raw", "Cleaned", "Expected"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.reason.map(|r| r.to_string()).unwrap_or_default(),
            self.source.to_string(),
            self.raw_candidate.clone(),
            self.cleaned_payload.clone(),
            self.expected.clone(),
        ]
    }
}

impl TableDisplay for UiCheckResult {
    fn headers() -> Vec<&'static str> {
        vec!["Check", "Status", "Detail"]
    }

    fn row(&self) -> Vec<String> {
        let (status, detail) = match &self.outcome {
            UiOutcome::Passed => ("✓ Passed".green().to_string(), String::new()),
            UiOutcome::Failed(reason) => ("✗ Failed".red().to_string(), reason.clone()),
            UiOutcome::Skipped(reason) => ("- Skipped".yellow().to_string(), reason.clone()),
        };
        vec![self.name.clone(), status, detail]
    }
}

/// A labelled value, for key/value listings
#[derive(Debug, Clone, Serialize)]
pub struct Field {
    pub name: String,
    pub value: String,
}

impl Field {
    pub fn new(name: impl Into<String>, value: impl ToString) -> Self {
        Self {
            name: name.into(),
            value: value.to_string(),
        }
    }
}

impl TableDisplay for Field {
    fn headers() -> Vec<&'static str> {
        vec!["Field", "Value"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.name.clone(), self.value.clone()]
    }
}

/// Stages shown by `inspect`, raw first
pub fn stage_fields(stages: &PipelineStages) -> Vec<Field> {
    vec![
        Field::new("source", stages.source),
        Field::new("raw", format!("{:?}", stages.raw)),
        Field::new("stripped", format!("{:?}", stages.stripped)),
        Field::new("isolated", format!("{:?}", stages.isolated)),
    ]
}

fn table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Print a serializable value in a machine format
pub fn print_serialized<T: Serialize + ?Sized>(value: &T, format: OutputFormat) {
    match format {
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(value).unwrap_or_default()),
        _ => println!("{}", serde_json::to_string_pretty(value).unwrap_or_default()),
    }
}

/// Print a list of items
pub fn print_list<T: Serialize + TableDisplay>(items: &[T], format: OutputFormat) {
    if items.is_empty() {
        println!("No items found.");
        return;
    }

    match format {
        OutputFormat::Table => {
            let mut table = table();
            table.set_header(T::headers());
            for item in items {
                table.add_row(item.row());
            }
            println!("{table}");
        }
        OutputFormat::Json | OutputFormat::Yaml => print_serialized(items, format),
        OutputFormat::Plain => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    println!("---");
                }
                let row = item.row();
                for (header, value) in T::headers().iter().zip(row.iter()) {
                    println!("{}: {}", header, value);
                }
            }
        }
    }
}

/// One-line aggregate
pub fn summary_line(report: &SuiteReport) -> String {
    let mut line = format!(
        "{} passed, {} failed, {} skipped of {} ({} ms)",
        report.passed, report.failed, report.skipped, report.total, report.duration_ms
    );
    let ui_failures = report.ui_checks.iter().filter(|c| c.is_failure()).count();
    if ui_failures > 0 {
        line.push_str(&format!(", {} UI check(s) failed", ui_failures));
    }
    line
}

/// Summary, failures and UI checks of a report
pub fn print_report(report: &SuiteReport, format: OutputFormat) {
    if matches!(format, OutputFormat::Json | OutputFormat::Yaml) {
        print_serialized(report, format);
        return;
    }

    println!();
    println!("{}", "━".repeat(60).dimmed());
    println!("{}", format!(" transcheck report: {}", report.target_url).bold());
    println!("{}", "━".repeat(60).dimmed());
    println!(
        "   Started:  {}",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC").to_string().dimmed()
    );

    let status = if report.all_passed() {
        "✓ PASS".green().bold()
    } else {
        "✗ FAIL".red().bold()
    };
    println!("   Result:   {}  {}", status, summary_line(report));
    println!();

    if !report.failures.is_empty() {
        println!("{}", "Failures".bold());
        print_list(&report.failures, format);
        println!();
    }

    if !report.ui_checks.is_empty() {
        println!("{}", "UI checks".bold());
        print_list(&report.ui_checks, format);
        println!();
    }
}

/// Print success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "Error:".red().bold(), message);
}

/// Print warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use transcheck_common::{CandidateSource, FailureReason};

    #[test]
    fn test_failure_row() {
        let entry = FailureEntry {
            id: "Neg_Fun_0001".into(),
            reason: Some(FailureReason::Mismatch),
            source: CandidateSource::Region,
            raw_candidate: "raw".into(),
            cleaned_payload: "මම".into(),
            expected: "අපි".into(),
        };
        let row = entry.row();
        assert_eq!(row.len(), FailureEntry::headers().len());
        assert_eq!(row[1], "mismatch");
        assert_eq!(row[2], "region");
    }

    #[test]
    fn test_summary_line_counts_ui_failures() {
        let now = Utc::now();
        let report = SuiteReport::new("u", now, now, Vec::new(), 0)
            .with_ui_checks(vec![UiCheckResult::failed("clear-resets-input", "still full")]);
        assert_eq!(
            summary_line(&report),
            "0 passed, 0 failed, 0 skipped of 0 (0 ms), 1 UI check(s) failed"
        );
    }

    #[test]
    fn test_stage_fields_order() {
        let stages = PipelineStages {
            raw: "Clear අ".into(),
            source: CandidateSource::Control,
            stripped: "අ".into(),
            isolated: "අ".into(),
        };
        let names: Vec<_> = stage_fields(&stages).into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["source", "raw", "stripped", "isolated"]);
    }
}
