//! Error types for the analytics engine
//!
//! Data-quality problems (malformed rows, missing columns, sparse input) are
//! not errors: the analyzers degrade to empty or zero-filled results. Errors
//! exist only for precondition violations in caller-supplied configuration
//! and for JSON encoding.

use thiserror::Error;

/// Errors that can occur during analysis
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Invalid glucose thresholds: {0}")]
    InvalidThresholds(String),

    #[error("Insulin action duration must be 1-10 hours, got {0}")]
    InvalidDuration(u32),

    #[error("Date parse error: {0}")]
    DateParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}
