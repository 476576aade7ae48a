//! Reporting protocol between validators and the message log.
//!
//! Validators emit severity-tagged [`Diagnostic`]s into a [`DiagnosticSink`]
//! without knowing how, or whether, they are displayed. [`ValidationContext`]
//! is the per-run sink owned by the caller.

pub mod token;

pub use token::{ActivationToken, TokenActivationHandler, TokenDispatcher};

use std::ops::{BitAnd, BitAndAssign};

use serde::{Deserialize, Serialize};

use crate::model::AssetData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "Info"),
            Severity::Warning => write!(f, "Warning"),
            Severity::Error => write!(f, "Error"),
        }
    }
}

/// Outcome of validating an asset, a node or a property.
///
/// Combining with `&` follows the data-validation rule: `Invalid` dominates,
/// then `Valid`; `NotValidated` is the identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationResult {
    #[default]
    NotValidated,
    Valid,
    Invalid,
}

impl ValidationResult {
    pub fn is_invalid(self) -> bool {
        self == ValidationResult::Invalid
    }
}

impl BitAnd for ValidationResult {
    type Output = ValidationResult;

    fn bitand(self, rhs: Self) -> Self::Output {
        use ValidationResult::*;
        match (self, rhs) {
            (Invalid, _) | (_, Invalid) => Invalid,
            (Valid, _) | (_, Valid) => Valid,
            (NotValidated, NotValidated) => NotValidated,
        }
    }
}

impl BitAndAssign for ValidationResult {
    fn bitand_assign(&mut self, rhs: Self) {
        *self = *self & rhs;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub severity: Severity,
    /// Object path of the asset the message is about.
    pub asset: String,
    pub token: Option<ActivationToken>,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.token {
            Some(token) => write!(
                f,
                "[{}] {}: {} ({})",
                self.severity,
                self.asset,
                self.message,
                token.display_text()
            ),
            None => write!(f, "[{}] {}: {}", self.severity, self.asset, self.message),
        }
    }
}

/// Destination for diagnostics emitted during a validation pass.
pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: Diagnostic);

    /// Number of error-severity diagnostics received so far.
    fn num_errors(&self) -> usize;
}

/// Emit one message about `asset`, optionally tied to a pin, node or blueprint.
pub fn add_token_message(
    sink: &mut dyn DiagnosticSink,
    severity: Severity,
    asset: &AssetData,
    token: Option<ActivationToken>,
    message: impl Into<String>,
) {
    sink.emit(Diagnostic {
        severity,
        asset: asset.object_path.clone(),
        token,
        message: message.into(),
    });
}

/// Per-run accumulator of diagnostics. Never shared between concurrently
/// validated assets; per-asset contexts are combined with [`merge`](Self::merge).
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    diagnostics: Vec<Diagnostic>,
    num_errors: usize,
    num_warnings: usize,
}

impl ValidationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn num_warnings(&self) -> usize {
        self.num_warnings
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    /// Append every diagnostic of `other`, preserving its order.
    pub fn merge(&mut self, other: ValidationContext) {
        self.num_errors += other.num_errors;
        self.num_warnings += other.num_warnings;
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl DiagnosticSink for ValidationContext {
    fn emit(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => self.num_errors += 1,
            Severity::Warning => self.num_warnings += 1,
            Severity::Info => {}
        }
        self.diagnostics.push(diagnostic);
    }

    fn num_errors(&self) -> usize {
        self.num_errors
    }
}
