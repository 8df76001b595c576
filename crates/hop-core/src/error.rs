//! Error types for the store, index, and resolver

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HopError {
    #[error("corrupt store {} at line {line}: {reason}", .path.display())]
    CorruptStore {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("no match for '{query}'")]
    NoMatch { query: String },

    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid exclude pattern: {0}")]
    InvalidPattern(#[from] globset::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HopError {
    /// Whether the error is recovered by falling back to an empty store.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::CorruptStore { .. })
    }

    pub fn is_no_match(&self) -> bool {
        matches!(self, Self::NoMatch { .. })
    }
}

pub type HopResult<T> = Result<T, HopError>;
