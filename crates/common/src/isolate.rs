//! Payload isolation
//!
//! Last line of defence after chrome stripping: whatever survived the literal
//! patterns (stray glyphs, markup debris, emoji) is cut away by keeping only
//! the longest run of allowed characters.

use crate::script::{AllowedCharset, DEFAULT_ALLOWED};

impl AllowedCharset {
    /// Longest run of allowed characters in `text`, trimmed.
    ///
    /// Runs are ranked by their trimmed length so a wide gap of whitespace
    /// never beats a shorter run that carries text. The earliest run wins a
    /// tie. Returns an empty string when no run has content.
    pub fn isolate(&self, text: &str) -> String {
        let mut runs: Vec<&str> = Vec::new();
        let mut run_start: Option<usize> = None;

        for (idx, c) in text.char_indices() {
            match (self.contains(c), run_start) {
                (true, None) => run_start = Some(idx),
                (false, Some(start)) => {
                    runs.push(&text[start..idx]);
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = run_start {
            runs.push(&text[start..]);
        }

        let mut best = "";
        let mut best_len = 0usize;
        for run in runs {
            let trimmed = run.trim();
            let len = trimmed.chars().count();
            if len > best_len {
                best = trimmed;
                best_len = len;
            }
        }

        best.to_string()
    }
}

/// Isolate against the default allowed set
pub fn isolate_payload(text: &str) -> String {
    DEFAULT_ALLOWED.isolate(text)
}
