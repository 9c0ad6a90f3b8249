//! Playwright-backed sessions

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};
use transcheck_common::config::BrowserKind;
use transcheck_common::surface::SurfaceResult;
use transcheck_common::{Config, RenderingSurface, SurfaceError, TextPredicate};

use crate::driver::{DriverCommand, DriverProcess, DriverReply};
use crate::error::{E2eError, E2eResult};
use crate::preflight::check_reachable;
use crate::session::{Session, SessionFactory};

/// Configuration for Playwright sessions
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub url: String,
    pub input_selector: String,
    pub control_selector: String,
    pub region_selector: String,
    pub browser: BrowserKind,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub navigation_timeout: Duration,
    pub preflight_timeout: Duration,
    /// Directory holding the `playwright` package, when not next to the
    /// working directory
    pub node_modules: Option<PathBuf>,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for PlaywrightConfig {
    fn from(config: &Config) -> Self {
        Self {
            url: config.target.url.clone(),
            input_selector: config.target.input_selector.clone(),
            control_selector: config.target.control_selector.clone(),
            region_selector: config.target.region_selector.clone(),
            browser: config.browser.kind,
            headless: config.browser.headless,
            viewport_width: config.browser.viewport_width,
            viewport_height: config.browser.viewport_height,
            navigation_timeout: config.timing.navigation_timeout(),
            preflight_timeout: config.timing.preflight_timeout(),
            node_modules: None,
        }
    }
}

/// Check that Playwright is installed
pub async fn check_playwright_installed() -> E2eResult<()> {
    let status = Command::new("npx")
        .args(["playwright", "--version"])
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .await;

    match status {
        Ok(status) if status.success() => Ok(()),
        _ => Err(E2eError::PlaywrightNotFound),
    }
}

/// One browser page on the target, driven through a [`DriverProcess`]
pub struct PlaywrightSession {
    driver: DriverProcess,
    config: PlaywrightConfig,
}

impl PlaywrightSession {
    /// Launch a browser and navigate to the target
    pub async fn open(config: PlaywrightConfig) -> E2eResult<Self> {
        let driver = DriverProcess::spawn(config.node_modules.as_deref()).await?;
        let session = Self { driver, config };

        session
            .command(DriverCommand::Launch {
                browser: session.config.browser.to_string(),
                headless: session.config.headless,
                width: session.config.viewport_width,
                height: session.config.viewport_height,
            })
            .await
            .map_err(|e| E2eError::DriverStartup(e.to_string()))?;

        session
            .command(DriverCommand::Goto {
                url: session.config.url.clone(),
                timeout_ms: session.config.navigation_timeout.as_millis() as u64,
            })
            .await
            .map_err(|e| {
                E2eError::SurfaceUnavailable(format!(
                    "navigation to {} failed: {}",
                    session.config.url, e
                ))
            })?;

        debug!("Session open on {}", session.config.url);
        Ok(session)
    }

    async fn command(&self, command: DriverCommand) -> E2eResult<DriverReply> {
        let limit = match &command {
            DriverCommand::Wait { ms } => {
                self.config.navigation_timeout + Duration::from_millis(*ms)
            }
            _ => self.config.navigation_timeout,
        };
        self.driver.request(command, limit).await
    }
}

#[async_trait]
impl RenderingSurface for PlaywrightSession {
    async fn control_values(&self) -> SurfaceResult<Vec<String>> {
        self.command(DriverCommand::Controls {
            selector: self.config.control_selector.clone(),
        })
        .await
        .map(|reply| reply.values)
        .map_err(|e| SurfaceError::Driver(e.to_string()))
    }

    async fn region_texts(&self, predicate: &TextPredicate) -> SurfaceResult<Vec<String>> {
        self.command(DriverCommand::Regions {
            selector: self.config.region_selector.clone(),
            pattern: predicate.source(),
        })
        .await
        .map(|reply| reply.values)
        .map_err(|e| SurfaceError::Driver(e.to_string()))
    }
}

#[async_trait]
impl Session for PlaywrightSession {
    async fn fill_input(&self, text: &str) -> E2eResult<()> {
        self.command(DriverCommand::Fill {
            selector: self.config.input_selector.clone(),
            value: text.to_string(),
        })
        .await?;
        Ok(())
    }

    async fn settle(&self, duration: Duration) -> E2eResult<()> {
        self.command(DriverCommand::Wait {
            ms: duration.as_millis() as u64,
        })
        .await?;
        Ok(())
    }

    async fn input_value(&self) -> E2eResult<String> {
        let reply = self
            .command(DriverCommand::InputValue {
                selector: self.config.input_selector.clone(),
            })
            .await?;
        Ok(reply.value.unwrap_or_default())
    }

    async fn click_text(&self, text: &str) -> E2eResult<bool> {
        let reply = self
            .command(DriverCommand::ClickText {
                text: text.to_string(),
                timeout_ms: self.config.navigation_timeout.as_millis() as u64,
            })
            .await?;
        Ok(reply.clicked.unwrap_or(false))
    }

    fn surface(&self) -> &dyn RenderingSurface {
        self
    }

    async fn close(self: Box<Self>) -> E2eResult<()> {
        let session = *self;
        session.driver.shutdown(session.config.navigation_timeout).await
    }
}

/// Opens a fresh browser per session
#[derive(Debug, Clone)]
pub struct PlaywrightFactory {
    config: PlaywrightConfig,
}

impl PlaywrightFactory {
    pub fn new(config: PlaywrightConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlaywrightConfig {
        &self.config
    }
}

#[async_trait]
impl SessionFactory for PlaywrightFactory {
    async fn preflight(&self) -> E2eResult<()> {
        check_playwright_installed().await?;
        check_reachable(&self.config.url, self.config.preflight_timeout).await?;
        info!(
            "Using {} ({}) against {}",
            self.config.browser,
            if self.config.headless { "headless" } else { "headed" },
            self.config.url
        );
        Ok(())
    }

    async fn open(&self) -> E2eResult<Box<dyn Session>> {
        Ok(Box::new(PlaywrightSession::open(self.config.clone()).await?))
    }

    fn target(&self) -> &str {
        &self.config.url
    }
}
