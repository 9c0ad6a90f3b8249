//! transcheck configuration
//!
//! Loaded from `transcheck.toml`. Every section is optional; missing keys take
//! their defaults.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::script::ScriptRange;
use crate::verify::ComparisonMode;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "transcheck.toml";

/// Fixed waits of the pipeline: after input injection, and before the
/// region fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleBudget {
    pub settle: Duration,
    pub grace: Duration,
}

impl SettleBudget {
    pub fn new(settle: Duration, grace: Duration) -> Self {
        Self { settle, grace }
    }

    /// No waiting at all, for offline surfaces
    pub fn immediate() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }
}

impl Default for SettleBudget {
    fn default() -> Self {
        Self::new(Duration::from_millis(2000), Duration::from_millis(500))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub target: TargetConfig,
    pub script: ScriptConfig,
    pub timing: TimingConfig,
    pub browser: BrowserConfig,
    pub run: RunConfig,
}

/// The page under test and how to find things on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub url: String,

    /// Selector of the phrase input
    pub input_selector: String,

    /// Selector of input-bearing controls; the output field is the second
    pub control_selector: String,

    /// Selector of display regions searched by the fallback
    pub region_selector: String,

    /// Caption of the button that clears the input
    pub clear_button_text: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            url: "https://www.swifttranslator.com/".to_string(),
            input_selector: r#"textarea[placeholder*="Singlish"]"#.to_string(),
            control_selector: "textarea".to_string(),
            region_selector: "div".to_string(),
            clear_button_text: "Clear".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    pub name: String,
    pub first: u32,
    pub last: u32,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        let range = ScriptRange::default();
        Self {
            name: "Sinhala".to_string(),
            first: range.first,
            last: range.last,
        }
    }
}

impl ScriptConfig {
    pub fn range(&self) -> ScriptRange {
        ScriptRange::new(self.first, self.last)
    }

    /// Name and code point range, for run headers
    pub fn label(&self) -> String {
        format!("{} (U+{:04X}..U+{:04X})", self.name, self.first, self.last)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub settle_ms: u64,
    pub grace_ms: u64,
    pub navigation_timeout_ms: u64,
    pub preflight_timeout_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_ms: 2000,
            grace_ms: 500,
            navigation_timeout_ms: 30_000,
            preflight_timeout_ms: 10_000,
        }
    }
}

impl TimingConfig {
    pub fn budget(&self) -> SettleBudget {
        SettleBudget::new(
            Duration::from_millis(self.settle_ms),
            Duration::from_millis(self.grace_ms),
        )
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn preflight_timeout(&self) -> Duration {
        Duration::from_millis(self.preflight_timeout_ms)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrowserKind::Chromium => write!(f, "chromium"),
            BrowserKind::Firefox => write!(f, "firefox"),
            BrowserKind::Webkit => write!(f, "webkit"),
        }
    }
}

impl FromStr for BrowserKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chromium" | "chrome" => Ok(BrowserKind::Chromium),
            "firefox" => Ok(BrowserKind::Firefox),
            "webkit" | "safari" => Ok(BrowserKind::Webkit),
            other => Err(format!("unknown browser: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub kind: BrowserKind,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            kind: BrowserKind::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Cases in flight at once, each in its own browser session
    pub concurrency: usize,
    pub comparison: ComparisonMode,
    pub output_dir: PathBuf,
    /// Stop scheduling cases after the first failure
    pub fail_fast: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            comparison: ComparisonMode::Exact,
            output_dir: PathBuf::from("test-results"),
            fail_fast: false,
        }
    }
}

impl Config {
    /// Load configuration from file, or defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.target.url.trim().is_empty() {
            return Err(Error::InvalidConfig("target.url is empty".into()));
        }
        if self.run.concurrency == 0 {
            return Err(Error::InvalidConfig("run.concurrency must be at least 1".into()));
        }
        let range = self.script.range();
        if !range.is_valid() {
            return Err(Error::InvalidConfig(format!(
                "script range U+{:04X}..U+{:04X} is not a valid code point interval",
                range.first, range.last
            )));
        }
        Ok(())
    }

    pub fn script_range(&self) -> ScriptRange {
        self.script.range()
    }

    pub fn budget(&self) -> SettleBudget {
        self.timing.budget()
    }

    pub fn report_dir(&self) -> &Path {
        &self.run.output_dir
    }
}
