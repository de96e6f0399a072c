//! config.rs
//! Session settings, loadable from a JSON file.

use std::fs;
use std::path::Path;

use anyhow::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Pair the lines of a replaced hunk so they align as Replace/Equal
    /// blocks instead of a Delete run followed by an Insert run.
    pub pair_changed_lines: bool,
    /// Paired lines differing only in whitespace become Equal pairs.
    pub ignore_whitespace: bool,
    /// Let block-to-block navigation stop on Context blocks.
    pub context_is_jump_target: bool,
    /// Language tags for the two sides; guessed from the file name when unset.
    pub language_a: Option<String>,
    pub language_b: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            pair_changed_lines: true,
            ignore_whitespace: true,
            context_is_jump_target: false,
            language_a: None,
            language_b: None,
        }
    }
}

impl SessionConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }
}
