//! AI configuration
//!
//! Plain structs passed into constructors. They deserialize from JSON with
//! every field optional (`#[serde(default)]`), or can be read from
//! `BLOCKBOT_*` environment variables.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::AiError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RanksConfig {
    /// Preview pieces searched after the current one
    pub preview_depth: usize,
    /// Stack columns; the well is the column right of them
    pub stack_width: usize,
    pub max_jump: u8,
    /// JSON rank table; a missing file falls back to an empty table
    pub table_path: Option<PathBuf>,
    /// Compute the next piece's move during ARE
    pub prethink: bool,
}

impl Default for RanksConfig {
    fn default() -> Self {
        Self {
            preview_depth: 2,
            stack_width: 9,
            max_jump: 2,
            table_path: None,
            prethink: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboConfig {
    /// Lookahead plies after the current piece
    pub max_depth: usize,
    /// Leftmost column of the 4-wide window (`None` = rightmost four columns)
    pub well_offset: Option<usize>,
}

impl Default for ComboConfig {
    fn default() -> Self {
        Self {
            max_depth: 5,
            well_offset: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Run the search on a dedicated worker thread (otherwise inline)
    pub threaded: bool,
    /// Pause between worker iterations that did work
    pub think_delay_ms: u64,
    pub ranks: RanksConfig,
    pub combo: ComboConfig,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            threaded: true,
            think_delay_ms: 0,
            ranks: RanksConfig::default(),
            combo: ComboConfig::default(),
        }
    }
}

impl AiConfig {
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();

        let threaded = env::var("BLOCKBOT_AI_THREADED")
            .map(|v| v != "0" && v.to_lowercase() != "false")
            .unwrap_or(defaults.threaded);

        let think_delay_ms = env::var("BLOCKBOT_AI_DELAY_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.think_delay_ms);

        let preview_depth = env::var("BLOCKBOT_RANKS_PREVIEW")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.ranks.preview_depth);

        let table_path = env::var("BLOCKBOT_RANKS_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .and_then(|s| if s.is_empty() { None } else { Some(s) })
            .map(PathBuf::from);

        let max_depth = env::var("BLOCKBOT_COMBO_DEPTH")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.combo.max_depth);

        Self {
            threaded,
            think_delay_ms,
            ranks: RanksConfig {
                preview_depth,
                table_path,
                ..defaults.ranks
            },
            combo: ComboConfig {
                max_depth,
                ..defaults.combo
            },
        }
    }

    pub fn from_json(text: &str) -> Result<Self, AiError> {
        Ok(serde_json::from_str(text)?)
    }
}
