//! transcheck live runner
//!
//! Drives the transliteration widget in a real browser and feeds the
//! rendered page to the verification pipeline in `transcheck-common`.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    SuiteRunner (Rust)                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  SessionFactory::preflight()   npx playwright, HTTP GET     │
//! │  per case (buffered, in corpus order):                      │
//! │    open() -> Session          node driver, JSON lines       │
//! │    fill_input(phrase)                                       │
//! │    settle(budget.settle)                                    │
//! │    Verifier::verify_case(case, session.surface())           │
//! │    close()                                                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  UI checks: real-time update, clear resets input            │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod driver;
pub mod error;
pub mod playwright;
pub mod preflight;
pub mod runner;
pub mod session;
pub mod ui_checks;

pub use error::{E2eError, E2eResult};
pub use playwright::{PlaywrightConfig, PlaywrightFactory, PlaywrightSession};
pub use runner::{RunnerOptions, SuiteRunner};
pub use session::{Session, SessionFactory};
pub use ui_checks::{run_ui_checks, UiCheckOptions};
