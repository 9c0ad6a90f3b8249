//! Saved report commands

use std::path::PathBuf;

use clap::Subcommand;
use transcheck_common::report::REPORT_FILE_NAME;
use transcheck_common::SuiteReport;

use crate::output::{self, OutputFormat};
use crate::Outcome;

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Show a report written by `transcheck run`
    Show {
        /// Report file
        #[arg(default_value = REPORT_FILE_NAME)]
        file: PathBuf,
    },
}

pub async fn execute(cmd: ReportCommands, format: OutputFormat) -> anyhow::Result<Outcome> {
    match cmd {
        ReportCommands::Show { file } => {
            let report = SuiteReport::load(&file)?;
            output::print_report(&report, format);
            Ok(Outcome::from_passed(report.all_passed()))
        }
    }
}
