//! Blueprint statistics and CSV export.

use serde::Serialize;

use crate::error::ValidatorError;
use crate::model::{AssetData, Blueprint, GraphKind, NodeKind};

use super::CancelFlag;
use super::registry::AssetRegistry;

/// Column names, asset identity first, then per-blueprint counts.
pub const COLUMNS: [&str; 11] = [
    "AssetName",
    "PackageName",
    "Graphs",
    "Events",
    "MacroGraphs",
    "Functions",
    "Components",
    "Timelines",
    "Variables",
    "Nodes",
    "Comments",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BlueprintStats {
    pub asset_name: String,
    pub package_name: String,
    pub graphs: usize,
    pub events: usize,
    pub macro_graphs: usize,
    pub functions: usize,
    pub components: usize,
    pub timelines: usize,
    pub variables: usize,
    pub nodes: usize,
    pub comments: usize,
}

impl BlueprintStats {
    pub fn new(blueprint: &Blueprint, asset: &AssetData) -> Self {
        let count_graphs = |kind: GraphKind| blueprint.graphs.iter().filter(|g| g.kind == kind).count();
        let mut stats = BlueprintStats {
            asset_name: asset.asset_name().to_string(),
            package_name: asset.package_name().to_string(),
            graphs: count_graphs(GraphKind::EventGraph),
            events: count_graphs(GraphKind::Event),
            macro_graphs: count_graphs(GraphKind::Macro),
            functions: count_graphs(GraphKind::Function),
            components: blueprint.components.len(),
            timelines: blueprint.timelines.len(),
            variables: blueprint.generated_class.properties.len(),
            ..BlueprintStats::default()
        };
        if blueprint.is_data_only() {
            return stats;
        }

        for node in blueprint.graphs.iter().flat_map(|g| &g.nodes) {
            stats.nodes += 1;
            if let NodeKind::Comment { .. } = node.kind {
                stats.comments += 1;
            }
        }
        stats
    }
}

/// Gather stats for every blueprint in `assets`. Non-blueprints and load
/// failures are skipped. The second value is `true` when cancelled.
pub fn collect(
    assets: &[AssetData],
    registry: &dyn AssetRegistry,
    cancel: &CancelFlag,
) -> (Vec<BlueprintStats>, bool) {
    let mut rows = Vec::with_capacity(assets.len());
    for asset in assets {
        if cancel.is_cancelled() {
            return (rows, true);
        }
        match registry.load(asset) {
            Ok(object) => {
                if let Some(blueprint) = object.as_blueprint() {
                    rows.push(BlueprintStats::new(blueprint, asset));
                }
            }
            Err(e) => tracing::warn!(asset = %asset.object_path, error = %e, "failed to load asset"),
        }
    }
    (rows, false)
}

/// Header row of bare column names, then one row per asset with every value
/// quoted and embedded quotes doubled.
pub fn export_csv(rows: &[BlueprintStats]) -> Result<String, ValidatorError> {
    let mut out = COLUMNS.join(",");
    out.push('\n');

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;

    out.push_str(&String::from_utf8_lossy(&bytes));
    Ok(out)
}
