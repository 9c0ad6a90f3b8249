//! Rendering surface abstraction
//!
//! The engine never talks to a browser directly. It reads the page through
//! two capabilities: the values of input-bearing controls, and the text of
//! display regions whose content matches a predicate. Both come back in
//! document order.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::script::ScriptRange;

/// Failures reading from a surface. Never fatal inside the extraction chain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("Control {index} not found ({available} control(s) on the surface)")]
    ControlNotFound { index: usize, available: usize },

    #[error("No region matches {pattern}")]
    RegionNotFound { pattern: String },

    #[error("Surface driver error: {0}")]
    Driver(String),
}

pub type SurfaceResult<T> = std::result::Result<T, SurfaceError>;

/// Content predicate for display regions.
///
/// Every predicate has a regex source so it can be shipped as text to a
/// browser-side driver as well as evaluated in-process against a snapshot.
#[derive(Debug, Clone)]
pub enum TextPredicate {
    /// Text carries at least one code point of the script
    Script(ScriptRange),
    /// Text matches an arbitrary regex
    Pattern(Regex),
}

impl TextPredicate {
    pub fn new(pattern: &str) -> std::result::Result<Self, regex::Error> {
        Ok(TextPredicate::Pattern(Regex::new(pattern)?))
    }

    pub fn target_script(script: ScriptRange) -> Self {
        TextPredicate::Script(script)
    }

    pub fn matches(&self, text: &str) -> bool {
        match self {
            TextPredicate::Script(script) => script.contains_target_script(text),
            TextPredicate::Pattern(regex) => regex.is_match(text),
        }
    }

    pub fn source(&self) -> String {
        match self {
            TextPredicate::Script(script) => script.class_pattern(),
            TextPredicate::Pattern(regex) => regex.as_str().to_string(),
        }
    }
}

/// Read-only view of a rendered page
#[async_trait]
pub trait RenderingSurface: Send + Sync {
    /// Current values of every input-bearing control
    async fn control_values(&self) -> SurfaceResult<Vec<String>>;

    /// Full text of every display region matching `predicate`
    async fn region_texts(&self, predicate: &TextPredicate) -> SurfaceResult<Vec<String>>;

    /// Value of the control at `index` (0-based)
    async fn read_control_value(&self, index: usize) -> SurfaceResult<String> {
        let mut values = self.control_values().await?;
        let available = values.len();
        if index < available {
            Ok(values.swap_remove(index))
        } else {
            Err(SurfaceError::ControlNotFound { index, available })
        }
    }

    /// Text of the last region matching `predicate`
    async fn read_region_text(&self, predicate: &TextPredicate) -> SurfaceResult<String> {
        self.region_texts(predicate)
            .await?
            .pop()
            .ok_or_else(|| SurfaceError::RegionNotFound {
                pattern: predicate.source(),
            })
    }
}

/// A captured page state: control values and region texts in document order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceSnapshot {
    #[serde(default)]
    pub controls: Vec<String>,
    #[serde(default)]
    pub regions: Vec<String>,
}

impl SurfaceSnapshot {
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

/// In-memory surface over a snapshot, with read counters.
///
/// Used for offline inspection of captured pages and as the stub surface in
/// tests. A surface built with [`SnapshotSurface::unavailable`] fails every
/// read with a driver error.
#[derive(Debug, Default)]
pub struct SnapshotSurface {
    snapshot: SurfaceSnapshot,
    unavailable: bool,
    control_reads: AtomicUsize,
    region_reads: AtomicUsize,
}

impl SnapshotSurface {
    pub fn new(snapshot: SurfaceSnapshot) -> Self {
        Self {
            snapshot,
            ..Default::default()
        }
    }

    pub fn with_controls<I, S>(controls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(SurfaceSnapshot {
            controls: controls.into_iter().map(Into::into).collect(),
            regions: Vec::new(),
        })
    }

    pub fn with_regions<I, S>(regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(SurfaceSnapshot {
            controls: Vec::new(),
            regions: regions.into_iter().map(Into::into).collect(),
        })
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Default::default()
        }
    }

    pub fn snapshot(&self) -> &SurfaceSnapshot {
        &self.snapshot
    }

    /// Number of `control_values` calls so far
    pub fn control_reads(&self) -> usize {
        self.control_reads.load(Ordering::SeqCst)
    }

    /// Number of `region_texts` calls so far
    pub fn region_reads(&self) -> usize {
        self.region_reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RenderingSurface for SnapshotSurface {
    async fn control_values(&self) -> SurfaceResult<Vec<String>> {
        self.control_reads.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(SurfaceError::Driver("snapshot surface is unavailable".into()));
        }
        Ok(self.snapshot.controls.clone())
    }

    async fn region_texts(&self, predicate: &TextPredicate) -> SurfaceResult<Vec<String>> {
        self.region_reads.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(SurfaceError::Driver("snapshot surface is unavailable".into()));
        }
        Ok(self
            .snapshot
            .regions
            .iter()
            .filter(|text| predicate.matches(text))
            .cloned()
            .collect())
    }
}
