//! Core error type.
//!
//! Sub-crates define their own error enums and convert `CoreError` into them
//! where a core operation can fail on their behalf.

use thiserror::Error;

/// The error type for `tf-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Shorthand result type for `tf-core`.
pub type CoreResult<T> = Result<T, CoreError>;
