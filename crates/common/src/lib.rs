//! transcheck common library
//!
//! The output-extraction and normalization engine: reads a noisy rendering
//! surface, recovers the translated text, strips UI chrome, isolates the
//! payload and verifies it against a golden value. Also the corpus, report
//! and configuration models shared by the runner and the CLI.

pub mod chrome;
pub mod config;
pub mod corpus;
pub mod error;
pub mod extract;
pub mod isolate;
pub mod report;
pub mod script;
pub mod surface;
pub mod verify;

pub use chrome::{strip_chrome, ChromePattern, ChromeStripper, DEFAULT_CHROME};
pub use config::{Config, SettleBudget};
pub use corpus::{Category, Corpus, LengthClass, TestCase};
pub use error::{Error, Result};
pub use extract::{CandidateSource, ExtractionCandidate, ExtractionChain, ExtractionStrategy};
pub use isolate::isolate_payload;
pub use report::{SuiteReport, UiCheckResult, UiOutcome};
pub use script::{contains_target_script, AllowedCharset, ScriptRange, SINHALA};
pub use surface::{RenderingSurface, SnapshotSurface, SurfaceError, SurfaceSnapshot, TextPredicate};
pub use verify::{ComparisonMode, FailureReason, Verdict, VerificationResult, Verifier};

/// transcheck version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
