//! Blueprint graph validation.
//!
//! Inspects loaded blueprints for banned function calls, casts to
//! blueprint-generated types, and pins or variables that hard-reference
//! blueprint-generated classes.

pub mod blueprint;
pub mod node;
pub mod property;
pub mod rules;

pub use blueprint::{BlueprintReport, NodeHandle};

use crate::config::ValidatorConfig;
use crate::model::{AssetData, LoadedObject};
use crate::report::{DiagnosticSink, ValidationResult};

/// Entry surface consumed by the asset-validation subsystem.
pub trait AssetValidator: Send + Sync {
    fn name(&self) -> &str;

    fn is_enabled(&self) -> bool;

    /// Whether independent assets may be validated concurrently, each with
    /// its own context.
    fn can_run_parallel(&self) -> bool {
        false
    }

    fn can_validate(&self, asset: &AssetData, object: Option<&LoadedObject>) -> bool;

    fn validate_loaded(
        &self,
        asset: &AssetData,
        object: &mut LoadedObject,
        sink: &mut dyn DiagnosticSink,
    ) -> ValidationResult;
}

/// Gate shared by every validator: enabled, loaded, top-level.
fn base_can_validate(enabled: bool, asset: &AssetData, object: Option<&LoadedObject>) -> bool {
    enabled && object.is_some() && asset.is_top_level
}

#[derive(Debug, Clone, Default)]
pub struct BlueprintGraphValidator {
    config: ValidatorConfig,
}

impl BlueprintGraphValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        BlueprintGraphValidator { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }
}

impl AssetValidator for BlueprintGraphValidator {
    fn name(&self) -> &str {
        "BlueprintGraph"
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn can_run_parallel(&self) -> bool {
        true
    }

    fn can_validate(&self, asset: &AssetData, object: Option<&LoadedObject>) -> bool {
        base_can_validate(self.is_enabled(), asset, object)
            && object.and_then(LoadedObject::as_blueprint).is_some()
    }

    fn validate_loaded(
        &self,
        asset: &AssetData,
        object: &mut LoadedObject,
        sink: &mut dyn DiagnosticSink,
    ) -> ValidationResult {
        let Some(blueprint) = object.as_blueprint_mut() else {
            return ValidationResult::NotValidated;
        };

        let report = self.validate_blueprint(blueprint, asset, sink);
        if !report.result.is_invalid() {
            tracing::debug!(asset = %asset.object_path, "asset passes blueprint graph validation");
        }
        report.result
    }
}
