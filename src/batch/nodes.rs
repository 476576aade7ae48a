//! Find blueprint nodes that fail validation and act on them.

use std::collections::BTreeMap;

use crate::error::ValidatorError;
use crate::model::{AssetData, Blueprint, LoadedObject};
use crate::report::{DiagnosticSink, ValidationContext, ValidationResult};
use crate::validate::{AssetValidator, BlueprintGraphValidator, NodeHandle};

use super::registry::AssetRegistry;
use super::{BatchOutcome, CancelFlag};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeAction {
    /// Log how many invalid nodes each blueprint has.
    Count,
    /// Drop stale error state and re-validate, then save.
    Refresh,
    /// Remove invalid nodes from their graphs, then save.
    Delete,
}

#[derive(Debug, Default)]
pub struct NodeActionSummary {
    pub result: ValidationResult,
    pub assets_processed: usize,
    /// Invalid nodes per blueprint object path.
    pub invalid_nodes: BTreeMap<String, Vec<NodeHandle>>,
    pub saved_packages: Vec<String>,
    pub context: ValidationContext,
    pub cancelled: bool,
}

impl NodeActionSummary {
    pub fn total_nodes(&self) -> usize {
        self.invalid_nodes.values().map(Vec::len).sum()
    }
}

impl From<NodeActionSummary> for BatchOutcome {
    fn from(summary: NodeActionSummary) -> Self {
        BatchOutcome {
            result: summary.result,
            assets_processed: summary.assets_processed,
            context: summary.context,
            cancelled: summary.cancelled,
            saved_packages: summary.saved_packages,
        }
    }
}

pub fn run(
    validator: &BlueprintGraphValidator,
    action: NodeAction,
    assets: &[AssetData],
    registry: &mut dyn AssetRegistry,
    cancel: &CancelFlag,
) -> Result<NodeActionSummary, ValidatorError> {
    let mut summary = NodeActionSummary::default();
    let mut failing: Vec<Blueprint> = Vec::new();

    for asset in assets {
        if cancel.is_cancelled() {
            summary.cancelled = true;
            break;
        }
        summary.assets_processed += 1;

        let object = match registry.load(asset) {
            Ok(object) => object,
            Err(e) => {
                tracing::warn!(asset = %asset.object_path, error = %e, "failed to load asset");
                continue;
            }
        };
        if !validator.can_validate(asset, Some(&object)) {
            continue;
        }
        let LoadedObject::Blueprint(mut blueprint) = object else {
            continue;
        };

        let report = validator.validate_blueprint(&mut blueprint, asset, &mut summary.context);
        summary.result &= report.result;
        if report.result.is_invalid() {
            summary.invalid_nodes.insert(report.blueprint, report.invalid_nodes);
            failing.push(blueprint);
        }
    }

    if summary.invalid_nodes.is_empty() {
        return Ok(summary);
    }

    match action {
        NodeAction::Count => {
            for (blueprint, nodes) in &summary.invalid_nodes {
                tracing::info!("Found {} invalid nodes for blueprint {}.", nodes.len(), blueprint);
            }
            tracing::info!(
                "Found total {} blueprints with {} invalid nodes.",
                summary.invalid_nodes.len(),
                summary.total_nodes()
            );
            return Ok(summary);
        }
        NodeAction::Refresh => {
            for blueprint in &mut failing {
                refresh_blueprint(validator, blueprint);
            }
        }
        NodeAction::Delete => {
            for blueprint in &mut failing {
                if let Some(nodes) = summary.invalid_nodes.get(&blueprint.path) {
                    delete_nodes(blueprint, nodes);
                }
            }
        }
    }

    tracing::info!("Saving {} packages.", failing.len());
    for blueprint in &failing {
        registry.save(blueprint)?;
        summary.saved_packages.push(blueprint.asset_data().package_name().to_string());
    }

    Ok(summary)
}

/// Clear every node's error state, then validate again so only nodes that
/// still violate a rule carry an error.
pub fn refresh_blueprint(validator: &BlueprintGraphValidator, blueprint: &mut Blueprint) -> ValidationResult {
    for graph in &mut blueprint.graphs {
        for node in &mut graph.nodes {
            node.clear_error();
        }
        graph.notify_graph_changed();
    }
    let asset = blueprint.asset_data();
    let mut scratch = ValidationContext::new();
    let report = validator.validate_blueprint(blueprint, &asset, &mut scratch);
    tracing::debug!(blueprint = %blueprint.path, errors = scratch.num_errors(), "blueprint refreshed");
    report.result
}

/// Remove the given nodes from their owning graphs. Returns how many were removed.
///
/// A handle whose position no longer holds a node with its id is ignored.
pub fn delete_nodes(blueprint: &mut Blueprint, nodes: &[NodeHandle]) -> usize {
    let mut by_graph: BTreeMap<usize, Vec<&NodeHandle>> = BTreeMap::new();
    for handle in nodes {
        by_graph.entry(handle.graph_index).or_default().push(handle);
    }

    let mut removed = 0;
    for (graph_index, mut handles) in by_graph {
        let Some(graph) = blueprint.graphs.get_mut(graph_index) else {
            continue;
        };
        // Highest position first so the remaining positions stay valid.
        handles.sort_by(|a, b| b.node_index.cmp(&a.node_index));
        handles.dedup_by_key(|handle| handle.node_index);

        let removed_before = removed;
        for handle in handles {
            if graph.remove_node_at(handle.node_index, &handle.node_id).is_some() {
                removed += 1;
            }
        }
        if removed > removed_before {
            graph.notify_graph_changed();
        }
    }
    tracing::debug!(blueprint = %blueprint.path, removed, "invalid nodes deleted");
    removed
}
