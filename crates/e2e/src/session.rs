//! Browser sessions as seen by the runner
//!
//! Each case gets its own session. The runner only needs to type a phrase,
//! wait, read the surface and press the clear button, so sessions are kept
//! behind these two traits and the runner can be driven without a browser.

use std::time::Duration;

use async_trait::async_trait;
use transcheck_common::RenderingSurface;

use crate::error::E2eResult;

/// One open page of the widget under test
#[async_trait]
pub trait Session: Send + Sync {
    /// Replace the phrase input's content
    async fn fill_input(&self, text: &str) -> E2eResult<()>;

    /// Fixed wait on the page
    async fn settle(&self, duration: Duration) -> E2eResult<()>;

    /// Current content of the phrase input
    async fn input_value(&self) -> E2eResult<String>;

    /// Click the visible button captioned `text`. `Ok(false)` when there is
    /// no such button.
    async fn click_text(&self, text: &str) -> E2eResult<bool>;

    /// Read side of the page
    fn surface(&self) -> &dyn RenderingSurface;

    async fn close(self: Box<Self>) -> E2eResult<()>;
}

/// Opens independent sessions against one target
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Fails when the target or the automation stack is unusable
    async fn preflight(&self) -> E2eResult<()>;

    async fn open(&self) -> E2eResult<Box<dyn Session>>;

    /// Where the sessions point, for the report
    fn target(&self) -> &str;
}
