//! Crate error type.
//!
//! Rule violations are never errors: they are reported as diagnostics through
//! the validation context. `ValidatorError` covers the failures around a
//! validation run (loading assets, reading configuration, writing reports).

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidatorError {
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {what} JSON: {source}")]
    Parse {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid validator configuration: {0}")]
    Config(String),

    #[error("failed to write CSV report: {0}")]
    Csv(#[from] csv::Error),

    #[error("a token activation handler is already registered")]
    HandlerAlreadyRegistered,

    #[error("asset '{0}' not found in registry")]
    MissingAsset(String),
}

impl ValidatorError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ValidatorError::Io {
            path: path.into(),
            source,
        }
    }
}
