//! WASM entry points for hosting the validator in a browser-based editor shell.

use wasm_bindgen::prelude::*;

use crate::config::ValidatorConfig;
use crate::error::ValidatorError;
use crate::model::{Blueprint, parse_blueprint};
use crate::report::{Diagnostic, ValidationContext, ValidationResult};
use crate::validate::{BlueprintGraphValidator, NodeHandle};

/// Validate a blueprint JSON document against a validator config JSON
/// (an empty string selects the default config).
/// Returns a JSON object with either `report` or `errors`.
#[wasm_bindgen]
pub fn validate_blueprint(blueprint_json: &str, config_json: &str) -> JsValue {
    let result = validate_blueprint_inner(blueprint_json, config_json);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

/// Validate and return the blueprint with node error state applied, so the
/// host can render error glyphs.
#[wasm_bindgen]
pub fn annotate_blueprint(blueprint_json: &str, config_json: &str) -> JsValue {
    let result = match load(blueprint_json, config_json) {
        Ok((mut blueprint, validator)) => {
            let asset = blueprint.asset_data();
            let mut context = ValidationContext::new();
            validator.validate_blueprint(&mut blueprint, &asset, &mut context);
            AnnotateResult::Success(blueprint)
        }
        Err(e) => AnnotateResult::Errors {
            errors: vec![ErrorDto::from(e)],
        },
    };
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn validate_blueprint_inner(blueprint_json: &str, config_json: &str) -> ValidateResult {
    let (mut blueprint, validator) = match load(blueprint_json, config_json) {
        Ok(loaded) => loaded,
        Err(e) => {
            return ValidateResult::Errors {
                errors: vec![ErrorDto::from(e)],
            };
        }
    };

    let asset = blueprint.asset_data();
    let mut context = ValidationContext::new();
    let report = validator.validate_blueprint(&mut blueprint, &asset, &mut context);

    ValidateResult::Report(ReportDto {
        result: report.result,
        diagnostics: context.into_diagnostics(),
        invalid_nodes: report.invalid_nodes,
    })
}

fn load(blueprint_json: &str, config_json: &str) -> Result<(Blueprint, BlueprintGraphValidator), ValidatorError> {
    let config = if config_json.trim().is_empty() {
        ValidatorConfig::default()
    } else {
        ValidatorConfig::from_json_str(config_json)?
    };
    let blueprint = parse_blueprint(blueprint_json)?;
    Ok((blueprint, BlueprintGraphValidator::new(config)))
}

// ---------------------------------------------------------------------------
// DTOs for serialization to JS
// ---------------------------------------------------------------------------

#[derive(serde::Serialize)]
struct ErrorDto {
    message: String,
}

impl From<ValidatorError> for ErrorDto {
    fn from(e: ValidatorError) -> Self {
        ErrorDto {
            message: e.to_string(),
        }
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportDto {
    result: ValidationResult,
    diagnostics: Vec<Diagnostic>,
    invalid_nodes: Vec<NodeHandle>,
}

#[derive(serde::Serialize)]
#[serde(tag = "status")]
enum ValidateResult {
    #[serde(rename = "report")]
    Report(ReportDto),
    #[serde(rename = "errors")]
    Errors { errors: Vec<ErrorDto> },
}

#[derive(serde::Serialize)]
#[serde(tag = "status")]
enum AnnotateResult {
    #[serde(rename = "success")]
    Success(Blueprint),
    #[serde(rename = "errors")]
    Errors { errors: Vec<ErrorDto> },
}
