//! Outer loop: every graph, every node, then the blueprint's own variables.

use serde::{Deserialize, Serialize};

use crate::model::{AssetData, Blueprint};
use crate::report::{DiagnosticSink, ValidationResult};

use super::BlueprintGraphValidator;
use super::property::validate_scope;

/// Location of a node found invalid, stable until the graph is edited.
///
/// Node ids are not guaranteed unique within a graph, so the node's position
/// is what identifies it; `node_id` must still match when the handle is used.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeHandle {
    pub graph_index: usize,
    pub node_index: usize,
    pub node_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintReport {
    /// Object path of the validated blueprint.
    pub blueprint: String,
    pub result: ValidationResult,
    pub invalid_nodes: Vec<NodeHandle>,
}

impl BlueprintGraphValidator {
    pub fn validate_blueprint(
        &self,
        blueprint: &mut Blueprint,
        asset: &AssetData,
        sink: &mut dyn DiagnosticSink,
    ) -> BlueprintReport {
        let mut report = BlueprintReport {
            blueprint: blueprint.path.clone(),
            result: ValidationResult::Valid,
            invalid_nodes: Vec::new(),
        };

        if blueprint.is_data_only() {
            tracing::debug!(blueprint = %blueprint.path, "data-only blueprint, nothing to validate");
            return report;
        }

        let Blueprint {
            path,
            graphs,
            generated_class,
            ..
        } = blueprint;

        for (graph_index, graph) in graphs.iter_mut().enumerate() {
            let errors_before = sink.num_errors();

            for (node_index, node) in graph.nodes.iter_mut().enumerate() {
                let node_result = self.validate_node(path, node, asset, sink);
                if node_result.is_invalid() {
                    report.invalid_nodes.push(NodeHandle {
                        graph_index,
                        node_index,
                        node_id: node.id.clone(),
                    });
                }
                report.result &= node_result;
            }

            if sink.num_errors() > errors_before {
                graph.notify_graph_changed();
            }
        }

        if self.config.validate_blueprint_variables {
            report.result &= validate_scope(generated_class, asset, sink);
        }

        report
    }
}
