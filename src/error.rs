//! Error types for portscout.
//!
//! Uses `thiserror` for ergonomic error definitions.
//!
//! Deliberately small: per-port network failures are contained inside the
//! worker that hit them and never surface as values of this type. What
//! remains is the configuration/setup surface that aborts a run, plus
//! result-file write failures.

use thiserror::Error;

/// Main error type for scanning operations.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("invalid port specification: {0}")]
    InvalidPortSpec(String),

    #[error("unsupported protocol: {0}")]
    UnsupportedProtocol(String),

    #[error("failed to resolve host '{host}': {reason}")]
    Resolve { host: String, reason: String },

    #[error("failed to write results to {path}: {reason}")]
    OutputWrite { path: String, reason: String },
}

/// Result type alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;
