//! Per-node rule dispatch.
//!
//! Every enabled rule category runs, so one node can collect several
//! diagnostics in a single pass. Any violation makes the node `Invalid` and
//! sets its compiler-error state.

use crate::model::{AssetData, MemberReference, Node, NodeKind, StructScope};
use crate::report::{ActivationToken, DiagnosticSink, Severity, ValidationResult, add_token_message};

use super::BlueprintGraphValidator;
use super::property::validate_scope;
use super::rules::*;

impl BlueprintGraphValidator {
    /// Validate a single node owned by the blueprint at path `blueprint`.
    pub fn validate_node(
        &self,
        blueprint: &str,
        node: &mut Node,
        asset: &AssetData,
        sink: &mut dyn DiagnosticSink,
    ) -> ValidationResult {
        let mut result = ValidationResult::Valid;

        let fail_reason = match &node.kind {
            NodeKind::CallFunction { function } => self.check_banned_function(function),
            NodeKind::DynamicCast { target_type } => {
                (self.config.validate_blueprint_casts && is_hard_reference_class(target_type.as_ref()))
                    .then(|| DYNAMIC_CAST_MESSAGE.to_string())
            }
            NodeKind::FunctionEntry { local_variables } => {
                result &= self.check_local_variables(local_variables.as_ref(), asset, sink);
                None
            }
            _ => None,
        };

        if let Some(reason) = fail_reason {
            let token = ActivationToken::for_node(node, blueprint, &reason);
            add_token_message(sink, Severity::Error, asset, Some(token), reason.as_str());
            node.set_error(reason);
            result &= ValidationResult::Invalid;
        }

        if self.config.validate_function_pins
            && self.config.banned_function_pins.contains(&node.class())
        {
            result &= self.check_pins(blueprint, node, asset, sink);
        }

        result
    }

    fn check_banned_function(&self, function: &MemberReference) -> Option<String> {
        if !self.config.validate_banned_functions || self.config.banned_functions.is_empty() {
            return None;
        }
        let qualified_name = function.qualified_name();
        find_banned_function(&qualified_name, &self.config.banned_functions)
            .map(|_| banned_function_message(&qualified_name))
    }

    fn check_local_variables(
        &self,
        local_variables: Option<&StructScope>,
        asset: &AssetData,
        sink: &mut dyn DiagnosticSink,
    ) -> ValidationResult {
        match local_variables {
            Some(scope) if self.config.validate_function_local_variables => {
                validate_scope(scope, asset, sink)
            }
            _ => ValidationResult::Valid,
        }
    }

    /// One diagnostic per offending pin; no pin is exempt.
    fn check_pins(
        &self,
        blueprint: &str,
        node: &mut Node,
        asset: &AssetData,
        sink: &mut dyn DiagnosticSink,
    ) -> ValidationResult {
        let owner: &Node = node;
        let tokens: Vec<ActivationToken> = owner
            .pins
            .iter()
            .filter(|pin| pin_declares_hard_reference(pin))
            .map(|pin| ActivationToken::for_pin(pin, owner, blueprint, PIN_MESSAGE))
            .collect();

        if tokens.is_empty() {
            return ValidationResult::Valid;
        }

        for token in tokens {
            add_token_message(sink, Severity::Error, asset, Some(token), PIN_MESSAGE);
        }
        node.set_error(PIN_MESSAGE);
        ValidationResult::Invalid
    }
}
