//! transcheck CLI
//!
//! Command-line interface for running transliteration corpora against the
//! live widget and for inspecting captured pages and saved reports offline.

pub mod commands;
pub mod output;

/// Process exit status of a finished command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Everything checked passed
    Passed,
    /// At least one case or check failed
    Failed,
}

impl Outcome {
    pub fn from_passed(passed: bool) -> Self {
        if passed {
            Outcome::Passed
        } else {
            Outcome::Failed
        }
    }

    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Passed => 0,
            Outcome::Failed => 1,
        }
    }
}

/// Exit code for fatal errors
pub const FATAL_EXIT_CODE: i32 = 2;
