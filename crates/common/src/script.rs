//! Target-script classification and the allowed payload character set

use serde::{Deserialize, Serialize};

/// A closed interval of code points that makes up the target script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScriptRange {
    /// First code point (inclusive)
    pub first: u32,
    /// Last code point (inclusive)
    pub last: u32,
}

/// Sinhala, as produced by Singlish transliteration widgets
pub const SINHALA: ScriptRange = ScriptRange::new(0x0D80, 0x0DF8);

impl Default for ScriptRange {
    fn default() -> Self {
        SINHALA
    }
}

impl ScriptRange {
    pub const fn new(first: u32, last: u32) -> Self {
        Self { first, last }
    }

    /// Whether a single character falls inside the range
    pub fn contains_char(&self, c: char) -> bool {
        let cp = c as u32;
        cp >= self.first && cp <= self.last
    }

    /// Whether `text` contains at least one target-script code point
    pub fn contains_target_script(&self, text: &str) -> bool {
        text.chars().any(|c| self.contains_char(c))
    }

    /// Both bounds must be scalar values and ordered
    pub fn is_valid(&self) -> bool {
        self.first <= self.last
            && char::from_u32(self.first).is_some()
            && char::from_u32(self.last).is_some()
    }

    /// Character-class source matching one code point of the range.
    ///
    /// Uses `\u{...}` escapes, which both the `regex` crate and JavaScript
    /// (with the `u` flag) understand, so the same source can filter regions
    /// inside the browser.
    pub fn class_pattern(&self) -> String {
        format!("[\\u{{{:X}}}-\\u{{{:X}}}]", self.first, self.last)
    }
}

/// Punctuation that may appear inside a translated sentence
const SENTENCE_PUNCTUATION: &[char] = &['!', '?', '.', ',', ';', ':', '-', '/'];

const ZERO_WIDTH_NON_JOINER: char = '\u{200C}';
const ZERO_WIDTH_JOINER: char = '\u{200D}';

/// Characters a reader accepts as part of a translated payload.
///
/// Target-script code points (vowel signs and virama included), the zero-width
/// joiners used in conjuncts, whitespace, sentence punctuation, ASCII digits
/// and ASCII Latin letters for untranslated words and brand names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowedCharset {
    script: ScriptRange,
}

/// Allowed set for the default target script
pub const DEFAULT_ALLOWED: AllowedCharset = AllowedCharset::for_script(SINHALA);

impl AllowedCharset {
    pub const fn for_script(script: ScriptRange) -> Self {
        Self { script }
    }

    pub fn script(&self) -> ScriptRange {
        self.script
    }

    pub fn contains(&self, c: char) -> bool {
        self.script.contains_char(c)
            || c == ZERO_WIDTH_JOINER
            || c == ZERO_WIDTH_NON_JOINER
            || c.is_whitespace()
            || c.is_ascii_alphanumeric()
            || SENTENCE_PUNCTUATION.contains(&c)
    }
}

/// Whether `text` contains Sinhala
pub fn contains_target_script(text: &str) -> bool {
    SINHALA.contains_target_script(text)
}
