//! Blueprint asset model: JSON → Rust types.

pub mod types;

pub use types::*;

use crate::error::ValidatorError;

/// Deserialize an exported blueprint JSON document.
pub fn parse_blueprint(json: &str) -> Result<Blueprint, ValidatorError> {
    serde_json::from_str::<Blueprint>(json).map_err(|source| ValidatorError::Parse {
        what: "blueprint".into(),
        source,
    })
}

/// Serialize a blueprint back to pretty-printed JSON, dropping transient state.
pub fn write_blueprint(blueprint: &Blueprint) -> Result<String, ValidatorError> {
    serde_json::to_string_pretty(blueprint).map_err(|source| ValidatorError::Parse {
        what: "blueprint".into(),
        source,
    })
}
