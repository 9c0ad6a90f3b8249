//! Test corpus model and loader
//!
//! A corpus is an ordered list of phrase records stored as YAML (a `cases:`
//! list) or JSON (the same object, or a bare array). A directory loads every
//! corpus file beneath it in path order. Integrity is checked at load time,
//! before any page is opened.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Positive,
    Negative,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Positive => write!(f, "positive"),
            Category::Negative => write!(f, "negative"),
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "positive" | "pos" => Ok(Category::Positive),
            "negative" | "neg" => Ok(Category::Negative),
            other => Err(format!("unknown category: {}", other)),
        }
    }
}

/// Rough phrase length: short, medium or long
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LengthClass {
    S,
    M,
    L,
}

impl fmt::Display for LengthClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LengthClass::S => write!(f, "S"),
            LengthClass::M => write!(f, "M"),
            LengthClass::L => write!(f, "L"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(alias = "type")]
    pub category: Category,
    #[serde(rename = "lengthClass", alias = "lengthType", alias = "length_class")]
    pub length_class: LengthClass,
    pub input: String,
    pub expected: String,
}

impl TestCase {
    /// `<id> - <name>`, or just the id when unnamed
    pub fn title(&self) -> String {
        if self.name.is_empty() {
            self.id.clone()
        } else {
            format!("{} - {}", self.id, self.name)
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CorpusFile {
    Wrapped { cases: Vec<TestCase> },
    Bare(Vec<TestCase>),
}

impl CorpusFile {
    fn into_cases(self) -> Vec<TestCase> {
        match self {
            CorpusFile::Wrapped { cases } | CorpusFile::Bare(cases) => cases,
        }
    }
}

/// Case counts by category and length class
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CorpusCounts {
    pub total: usize,
    pub by_category: BTreeMap<Category, usize>,
    pub by_length: BTreeMap<LengthClass, usize>,
}

/// Ordered, validated set of cases
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Corpus {
    pub cases: Vec<TestCase>,
}

impl Corpus {
    /// Build and validate
    pub fn new(source_name: &str, cases: Vec<TestCase>) -> Result<Self> {
        let corpus = Self { cases };
        corpus.validate(source_name)?;
        Ok(corpus)
    }

    pub fn from_yaml(source_name: &str, content: &str) -> Result<Self> {
        let file: CorpusFile = serde_yaml::from_str(content)
            .map_err(|e| Error::corpus(source_name, e.to_string()))?;
        Self::new(source_name, file.into_cases())
    }

    pub fn from_json(source_name: &str, content: &str) -> Result<Self> {
        let file: CorpusFile = serde_json::from_str(content)
            .map_err(|e| Error::corpus(source_name, e.to_string()))?;
        Self::new(source_name, file.into_cases())
    }

    /// Load a single file, picking the format from its extension
    pub fn from_file(path: &Path) -> Result<Self> {
        let source_name = path.display().to_string();
        let content = std::fs::read_to_string(path)?;
        match corpus_extension(path) {
            Some("yaml") | Some("yml") => Self::from_yaml(&source_name, &content),
            Some("json") => Self::from_json(&source_name, &content),
            _ => Err(Error::UnsupportedFormat(source_name)),
        }
    }

    /// Load every corpus file under `dir`, concatenated in path order
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut files: Vec<_> = WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && corpus_extension(e.path()).is_some())
            .map(|e| e.into_path())
            .collect();
        files.sort();

        let mut cases = Vec::new();
        for file in &files {
            debug!("Loading corpus file {}", file.display());
            cases.extend(Self::from_file(file)?.cases);
        }
        Self::new(&dir.display().to_string(), cases)
    }

    /// Load a file or a directory
    pub fn load(path: &Path) -> Result<Self> {
        if path.is_dir() {
            Self::load_dir(path)
        } else {
            Self::from_file(path)
        }
    }

    /// Ids must be present, free of whitespace and unique
    pub fn validate(&self, source_name: &str) -> Result<()> {
        let mut seen = HashSet::new();
        for (idx, case) in self.cases.iter().enumerate() {
            if case.id.trim().is_empty() {
                return Err(Error::corpus(
                    source_name,
                    format!("case #{} has an empty id", idx + 1),
                ));
            }
            if case.id.chars().any(char::is_whitespace) {
                return Err(Error::corpus(
                    source_name,
                    format!("case id {:?} contains whitespace", case.id),
                ));
            }
            if !seen.insert(case.id.as_str()) {
                return Err(Error::corpus(
                    source_name,
                    format!("duplicate case id {}", case.id),
                ));
            }
        }
        Ok(())
    }

    /// Keep cases whose id is in `only` (when non-empty) and whose category
    /// matches `category` (when given). Order is preserved.
    pub fn filter(&self, only: &[String], category: Option<Category>) -> Corpus {
        let cases = self
            .cases
            .iter()
            .filter(|c| only.is_empty() || only.iter().any(|id| id == &c.id))
            .filter(|c| category.map_or(true, |cat| c.category == cat))
            .cloned()
            .collect();
        Corpus { cases }
    }

    pub fn get(&self, id: &str) -> Option<&TestCase> {
        self.cases.iter().find(|c| c.id == id)
    }

    pub fn counts(&self) -> CorpusCounts {
        let mut counts = CorpusCounts {
            total: self.cases.len(),
            ..Default::default()
        };
        for case in &self.cases {
            *counts.by_category.entry(case.category).or_default() += 1;
            *counts.by_length.entry(case.length_class).or_default() += 1;
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

fn corpus_extension(path: &Path) -> Option<&'static str> {
    match path.extension()?.to_str()?.to_lowercase().as_str() {
        "yaml" => Some("yaml"),
        "yml" => Some("yml"),
        "json" => Some("json"),
        _ => None,
    }
}
