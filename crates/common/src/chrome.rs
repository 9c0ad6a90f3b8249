//! UI chrome removal
//!
//! The widget renders product branding, feature toggles, button captions and
//! icon glyphs around the translated text. Any of those can leak into an
//! extraction candidate, so they are deleted before the payload is isolated.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// A piece of non-payload UI text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromePattern {
    /// Exact substring, matched case-insensitively
    Literal(&'static str),
    /// Shortest span from `from` to the next `to` on the same line
    Span {
        from: &'static str,
        to: &'static str,
    },
}

impl ChromePattern {
    fn to_regex(self) -> Result<Regex, regex::Error> {
        let source = match self {
            ChromePattern::Literal(text) => regex::escape(text),
            ChromePattern::Span { from, to } => {
                format!("{}.*?{}", regex::escape(from), regex::escape(to))
            }
        };
        RegexBuilder::new(&source).case_insensitive(true).build()
    }
}

/// Chrome rendered by the Singlish translator page
pub const DEFAULT_CHROME: &[ChromePattern] = &[
    ChromePattern::Span {
        from: "Singlish",
        to: "Translator",
    },
    ChromePattern::Literal("Switch Typing Language"),
    ChromePattern::Literal("Features"),
    ChromePattern::Literal("View Suggestions"),
    ChromePattern::Literal("Word Autocorrect"),
    ChromePattern::Literal("Singlish Touchpad"),
    ChromePattern::Literal("Translate"),
    ChromePattern::Literal("Clear"),
    ChromePattern::Literal("English"),
    ChromePattern::Literal("🔁"),
    ChromePattern::Literal("🗑\u{FE0F}"),
    ChromePattern::Literal("🗑"),
];

static DEFAULT_STRIPPER: Lazy<ChromeStripper> = Lazy::new(|| {
    ChromeStripper::new(DEFAULT_CHROME).expect("built-in chrome patterns are valid regexes")
});

/// Compiled set of chrome patterns
#[derive(Debug, Clone)]
pub struct ChromeStripper {
    patterns: Vec<Regex>,
}

impl ChromeStripper {
    pub fn new(patterns: &[ChromePattern]) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|p| p.to_regex())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Shared stripper for [`DEFAULT_CHROME`]
    pub fn standard() -> &'static ChromeStripper {
        &DEFAULT_STRIPPER
    }

    /// Delete every pattern occurrence and trim.
    ///
    /// A deletion can join two fragments into a fresh occurrence
    /// ("TransClearlate"), so passes repeat until the text is stable. The
    /// result is therefore a fixed point and stripping it again is a no-op.
    pub fn strip(&self, text: &str) -> String {
        let mut current = text.trim().to_string();
        loop {
            let mut next = current.clone();
            for pattern in &self.patterns {
                if pattern.is_match(&next) {
                    next = pattern.replace_all(&next, "").into_owned();
                }
            }
            let next = next.trim().to_string();
            if next == current {
                return current;
            }
            current = next;
        }
    }
}

/// Strip the default chrome set
pub fn strip_chrome(text: &str) -> String {
    ChromeStripper::standard().strip(text)
}
