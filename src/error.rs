//! Error types for configuration loading.
//!
//! Everything in here is fatal at startup: a broken policy or catalog file is
//! reported before any package enters the pipeline.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("malformed JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid version range '{range}': {reason}")]
    InvalidVersionRange { range: String, reason: String },

    #[error("package override #{index} has an empty id")]
    EmptyOverrideId { index: usize },

    #[error("package id must not be empty")]
    EmptyPackageId,
}

pub type Result<T> = std::result::Result<T, ConfigError>;
