//! Blueprint graph validator settings.
//!
//! Read once from the settings store and treated as read-only during a run.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ValidatorError;
use crate::model::NodeClass;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidatorConfig {
    pub enabled: bool,
    /// `"<Class>.<Function>"` entries matched exactly against call-function nodes.
    pub banned_functions: Vec<String>,
    /// Node kinds whose pins form an externally referenceable signature.
    pub banned_function_pins: BTreeSet<NodeClass>,
    pub validate_banned_functions: bool,
    pub validate_blueprint_casts: bool,
    pub validate_function_pins: bool,
    pub validate_function_local_variables: bool,
    pub validate_blueprint_variables: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        ValidatorConfig {
            enabled: true,
            banned_functions: Vec::new(),
            banned_function_pins: BTreeSet::from([
                NodeClass::CustomEvent,
                NodeClass::FunctionEntry,
                NodeClass::FunctionResult,
                NodeClass::Literal,
                NodeClass::Select,
            ]),
            validate_banned_functions: true,
            validate_blueprint_casts: true,
            validate_function_pins: true,
            validate_function_local_variables: true,
            validate_blueprint_variables: true,
        }
    }
}

impl ValidatorConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ValidatorError> {
        let config: ValidatorConfig = serde_json::from_str(json).map_err(|source| ValidatorError::Parse {
            what: "validator config".into(),
            source,
        })?;
        config.check()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ValidatorError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ValidatorError::io(path, e))?;
        Self::from_json_str(&json)
    }

    fn check(&self) -> Result<(), ValidatorError> {
        for entry in &self.banned_functions {
            match entry.split_once('.') {
                Some((class, function)) if !class.is_empty() && !function.is_empty() => {}
                _ => {
                    return Err(ValidatorError::Config(format!(
                        "banned function '{}' must have the form '<Class>.<Function>'",
                        entry
                    )));
                }
            }
        }
        Ok(())
    }
}
