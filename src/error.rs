//! Error types.
//!
//! Analysis errors never leave the analyzer's public entry points: they are
//! logged and collapsed to documented fallback values. Service errors are
//! what a caller of the chat/mood contracts sees.

use std::path::PathBuf;
use thiserror::Error;

/// Internal failure inside the analysis pipeline.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("sentiment analysis failed: {0}")]
    Sentiment(String),

    #[error("no genre mapping for `{0}`")]
    MissingGenreMapping(&'static str),

    #[error("response generator has no message templates")]
    NoTemplates,
}

/// Failure to build or load a lexicon.
#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("invalid keyword pattern for `{label}`")]
    Pattern {
        label: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("failed to read lexicon file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid lexicon file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A string that names no catalogue genre column.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid genre: `{0}`")]
pub struct GenreParseError(pub String);

/// Failure of a recommendation contract.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Missing, empty or non-text input. The caller's fault.
    #[error("{0}")]
    InvalidInput(&'static str),

    #[error("catalogue lookup failed")]
    Catalogue(#[source] anyhow::Error),
}

impl ServiceError {
    /// Whether this error should be reported as a client error (HTTP 400).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, ServiceError::InvalidInput(_))
    }
}
