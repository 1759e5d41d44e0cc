//! Error types for amrkit operations.
//!
//! This module provides the main error type [`AmrkitError`] which wraps
//! the error conditions that can occur while reading a corpus or exchanging
//! alignments as JSON.

use std::io;

use thiserror::Error;

use amrkit_parser::{BlockError, ParseError};

/// The main error type for amrkit operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant carries the diagnostics of a failed block together with
/// the source text their spans point into, so callers can render snippets.
#[derive(Debug, Error)]
pub enum AmrkitError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AmrkitError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }

    /// Create a `Parse` error from a failed block of `src`.
    pub fn from_block(error: BlockError, src: impl Into<String>) -> Self {
        Self::new_parse_error(error.into_error(), src)
    }
}
