//! Batch driver: enumerate registry assets and run one action over them.
//!
//! Per-asset validation work always completes before any package is saved.
//! The cancel flag is checked between whole assets only.

pub mod nodes;
pub mod registry;
pub mod stats;

pub use nodes::{NodeAction, NodeActionSummary};
pub use registry::{AssetFilter, AssetRegistry, DirectoryRegistry, MemoryRegistry};
pub use stats::{BlueprintStats, export_csv};

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;

use crate::error::ValidatorError;
use crate::model::AssetData;
use crate::report::{ValidationContext, ValidationResult};
use crate::validate::{AssetValidator, BlueprintGraphValidator};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchAction {
    Validate,
    FindNodes(NodeAction),
    BlueprintStats { out_file: PathBuf },
}

/// Shared user-cancel flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub result: ValidationResult,
    pub assets_processed: usize,
    pub context: ValidationContext,
    pub cancelled: bool,
    /// Packages written back by node actions.
    pub saved_packages: Vec<String>,
}

impl BatchOutcome {
    pub fn exit_code(&self) -> i32 {
        if self.result.is_invalid() { EXIT_FAILURE } else { EXIT_SUCCESS }
    }

    /// Whether the selection was empty and the run was not cancelled.
    pub fn matched_nothing(&self) -> bool {
        self.assets_processed == 0 && !self.cancelled
    }

    /// Process exit status after running `action`. An empty selection fails.
    /// Past that, only `Validate` reports rule failures.
    pub fn exit_status(&self, action: &BatchAction) -> i32 {
        if self.matched_nothing() {
            return EXIT_FAILURE;
        }
        match action {
            BatchAction::Validate => self.exit_code(),
            BatchAction::FindNodes(_) | BatchAction::BlueprintStats { .. } => EXIT_SUCCESS,
        }
    }
}

pub struct BatchDriver {
    validator: BlueprintGraphValidator,
    filter: AssetFilter,
    cancel: CancelFlag,
    parallel: bool,
}

impl BatchDriver {
    pub fn new(validator: BlueprintGraphValidator, filter: AssetFilter) -> Self {
        BatchDriver {
            validator,
            filter,
            cancel: CancelFlag::new(),
            parallel: false,
        }
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Validate assets on a worker pool when the validator allows it.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn run(
        &self,
        action: &BatchAction,
        registry: &mut dyn AssetRegistry,
    ) -> Result<BatchOutcome, ValidatorError> {
        let assets = self.filter.select(registry);
        tracing::info!(assets = assets.len(), action = ?action, "running batch action");
        if assets.is_empty() {
            return Ok(BatchOutcome::default());
        }

        match action {
            BatchAction::Validate => Ok(self.validate_assets(&assets, registry)),
            BatchAction::FindNodes(node_action) => {
                let summary =
                    nodes::run(&self.validator, *node_action, &assets, registry, &self.cancel)?;
                Ok(summary.into())
            }
            BatchAction::BlueprintStats { out_file } => {
                let (rows, cancelled) = stats::collect(&assets, registry, &self.cancel);
                let csv = export_csv(&rows)?;
                std::fs::write(out_file, csv).map_err(|e| ValidatorError::io(out_file, e))?;
                tracing::info!(rows = rows.len(), file = %out_file.display(), "blueprint stats exported");
                Ok(BatchOutcome {
                    result: ValidationResult::Valid,
                    assets_processed: rows.len(),
                    cancelled,
                    ..BatchOutcome::default()
                })
            }
        }
    }

    fn validate_assets(&self, assets: &[AssetData], registry: &dyn AssetRegistry) -> BatchOutcome {
        if self.parallel && self.validator.can_run_parallel() {
            return self.validate_assets_parallel(assets, registry);
        }

        let mut outcome = BatchOutcome::default();
        for asset in assets {
            if self.cancel.is_cancelled() {
                outcome.cancelled = true;
                break;
            }
            let mut context = ValidationContext::new();
            outcome.result &= validate_one(&self.validator, asset, registry, &mut context);
            outcome.context.merge(context);
            outcome.assets_processed += 1;
        }
        log_outcome(&outcome);
        outcome
    }

    fn validate_assets_parallel(&self, assets: &[AssetData], registry: &dyn AssetRegistry) -> BatchOutcome {
        let per_asset: Vec<Option<(ValidationResult, ValidationContext)>> = assets
            .par_iter()
            .map(|asset| {
                if self.cancel.is_cancelled() {
                    return None;
                }
                let mut context = ValidationContext::new();
                let result = validate_one(&self.validator, asset, registry, &mut context);
                Some((result, context))
            })
            .collect();

        let mut outcome = BatchOutcome::default();
        for entry in per_asset {
            match entry {
                Some((result, context)) => {
                    outcome.result &= result;
                    outcome.context.merge(context);
                    outcome.assets_processed += 1;
                }
                None => outcome.cancelled = true,
            }
        }
        log_outcome(&outcome);
        outcome
    }
}

/// Load and validate one asset. Load failures are logged and skipped.
fn validate_one(
    validator: &BlueprintGraphValidator,
    asset: &AssetData,
    registry: &dyn AssetRegistry,
    context: &mut ValidationContext,
) -> ValidationResult {
    let mut object = match registry.load(asset) {
        Ok(object) => object,
        Err(e) => {
            tracing::warn!(asset = %asset.object_path, error = %e, "failed to load asset");
            return ValidationResult::NotValidated;
        }
    };
    if !validator.can_validate(asset, Some(&object)) {
        return ValidationResult::NotValidated;
    }
    validator.validate_loaded(asset, &mut object, context)
}

fn log_outcome(outcome: &BatchOutcome) {
    use crate::report::DiagnosticSink;

    for diagnostic in outcome.context.errors() {
        tracing::error!("{}", diagnostic);
    }
    tracing::info!(
        assets = outcome.assets_processed,
        errors = outcome.context.num_errors(),
        cancelled = outcome.cancelled,
        "validation finished"
    );
}
