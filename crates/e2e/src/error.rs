//! Error types for the live runner

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Playwright not found. Install with: npm install playwright && npx playwright install")]
    PlaywrightNotFound,

    #[error("Driver failed to start: {0}")]
    DriverStartup(String),

    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Driver protocol error: {0}")]
    Protocol(String),

    #[error("Surface unavailable: {0}")]
    SurfaceUnavailable(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Common(#[from] transcheck_common::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;
