//! Property validation: object- and class-valued fields of a structural type.

use crate::model::{AssetData, Property, StructScope};
use crate::report::{ActivationToken, DiagnosticSink, Severity, ValidationResult, add_token_message};

use super::rules::{PROPERTY_MESSAGE, is_hard_reference_class};

/// Validate one field. Fields that are neither object- nor class-valued are
/// always valid.
pub fn validate_property(
    property: &Property,
    asset: &AssetData,
    sink: &mut dyn DiagnosticSink,
) -> ValidationResult {
    let Some(class) = property.ty.object_target() else {
        return ValidationResult::Valid;
    };

    if is_hard_reference_class(Some(class)) {
        tracing::debug!(property = %property.name, class = %class.name, "hard-reference property");
        let token = ActivationToken::for_asset(asset);
        add_token_message(sink, Severity::Error, asset, Some(token), PROPERTY_MESSAGE);
        return ValidationResult::Invalid;
    }

    ValidationResult::Valid
}

/// Validate every own object/class-valued field of `scope`. Every field is
/// checked even after a failure.
pub fn validate_scope(
    scope: &StructScope,
    asset: &AssetData,
    sink: &mut dyn DiagnosticSink,
) -> ValidationResult {
    let mut result = ValidationResult::Valid;
    for (property, _) in scope.object_fields() {
        result &= validate_property(property, asset, sink);
    }
    result
}
