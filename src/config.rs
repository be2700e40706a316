//! Rendering and traversal settings, optionally parsed from `.toml` files.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The default nesting limit for type graphs.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// The default line width handed to the pretty printer.
pub const DEFAULT_WIDTH: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Graphs nested deeper than this are rejected with
    /// [`Error::DepthExceeded`](crate::error::Error::DepthExceeded).
    pub max_depth: usize,
    pub width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            width: DEFAULT_WIDTH,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let file_contents = std::fs::read_to_string(&path)?;
        let config = toml::from_str(&file_contents)?;
        Ok(config)
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
