//! Batch driver: validation runs, node actions and stats export.

#[allow(dead_code)]
mod helpers;

use blueprint_validator::batch::*;
use blueprint_validator::model::*;
use blueprint_validator::report::{DiagnosticSink, ValidationResult};
use blueprint_validator::validate::NodeHandle;
use helpers::*;

fn spawner() -> Blueprint {
    blueprint(
        "BP_Spawner",
        vec![event_graph(vec![
            call("ok", "Actor", "GetActorLocation"),
            banned_call("bad"),
            custom_event("ev").with_pins(vec![bp_pin("enemy")]),
        ])],
    )
}

fn clean() -> Blueprint {
    blueprint("BP_Clean", vec![event_graph(vec![call("ok", "Actor", "SetOwner")])])
}

fn registry() -> MemoryRegistry {
    let mut registry = MemoryRegistry::new();
    registry.insert_blueprint(spawner());
    registry.insert_blueprint(clean());
    registry.insert_other("/Game/Test/T_Wall.T_Wall", "Texture2D");
    registry
}

fn driver() -> BatchDriver {
    BatchDriver::new(
        validator(),
        AssetFilter {
            blueprints_only: true,
            ..AssetFilter::default()
        },
    )
}

// =============================================================================
// Validate
// =============================================================================

#[test]
fn validate_reports_failure_exit_code() {
    let mut registry = registry();
    let outcome = driver().run(&BatchAction::Validate, &mut registry).unwrap();

    assert_eq!(outcome.result, ValidationResult::Invalid);
    assert_eq!(outcome.assets_processed, 2);
    assert_eq!(outcome.context.num_errors(), 2);
    assert_eq!(outcome.exit_code(), EXIT_FAILURE);
    assert!(outcome.saved_packages.is_empty());
    assert!(registry.saved().is_empty());
}

#[test]
fn validate_clean_assets_succeeds() {
    let mut registry = MemoryRegistry::new();
    registry.insert_blueprint(clean());
    let outcome = driver().run(&BatchAction::Validate, &mut registry).unwrap();
    assert_eq!(outcome.result, ValidationResult::Valid);
    assert_eq!(outcome.exit_code(), EXIT_SUCCESS);
}

#[test]
fn empty_selection_is_not_validated() {
    let mut registry = registry();
    let filter = AssetFilter {
        path_prefixes: vec!["/Game/Nowhere/".into()],
        blueprints_only: true,
    };
    let outcome = BatchDriver::new(validator(), filter)
        .run(&BatchAction::Validate, &mut registry)
        .unwrap();
    assert_eq!(outcome.assets_processed, 0);
    assert_eq!(outcome.result, ValidationResult::NotValidated);
}

#[test]
fn filter_prefixes_select_matching_paths() {
    let filter = AssetFilter {
        path_prefixes: vec!["/Game/Test/BP_Clean".into()],
        blueprints_only: true,
    };
    let selected = filter.select(&registry());
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].asset_name(), "BP_Clean");
}

#[test]
fn parallel_run_matches_serial_run() {
    let mut registry = MemoryRegistry::new();
    for i in 0..16 {
        let mut bp = spawner();
        bp.name = format!("BP_Spawner{:02}", i);
        bp.path = format!("/Game/Test/{0}.{0}", bp.name);
        registry.insert_blueprint(bp);
    }

    let serial = driver().run(&BatchAction::Validate, &mut registry).unwrap();
    let parallel = driver()
        .with_parallel(true)
        .run(&BatchAction::Validate, &mut registry)
        .unwrap();

    assert_eq!(serial.result, parallel.result);
    assert_eq!(serial.assets_processed, parallel.assets_processed);
    assert_eq!(serial.context.diagnostics(), parallel.context.diagnostics());
}

#[test]
fn exit_status_depends_on_action_and_selection() {
    let mut registry = registry();
    let validate = driver().run(&BatchAction::Validate, &mut registry).unwrap();
    assert_eq!(validate.exit_status(&BatchAction::Validate), EXIT_FAILURE);

    let count = BatchAction::FindNodes(NodeAction::Count);
    let outcome = driver().run(&count, &mut registry).unwrap();
    assert_eq!(outcome.result, ValidationResult::Invalid);
    assert_eq!(outcome.exit_status(&count), EXIT_SUCCESS);

    let mut clean_only = MemoryRegistry::new();
    clean_only.insert_blueprint(clean());
    let outcome = driver().run(&BatchAction::Validate, &mut clean_only).unwrap();
    assert_eq!(outcome.exit_status(&BatchAction::Validate), EXIT_SUCCESS);

    let nowhere = AssetFilter {
        path_prefixes: vec!["/Game/Nowhere/".into()],
        blueprints_only: true,
    };
    for action in [BatchAction::Validate, count] {
        let outcome = BatchDriver::new(validator(), nowhere.clone())
            .run(&action, &mut registry)
            .unwrap();
        assert!(outcome.matched_nothing());
        assert_eq!(outcome.exit_status(&action), EXIT_FAILURE);
    }
}

#[test]
fn cancelled_run_is_not_an_empty_selection() {
    let cancel = CancelFlag::new();
    cancel.cancel();
    let mut registry = registry();
    let outcome = driver()
        .with_cancel_flag(cancel)
        .run(&BatchAction::Validate, &mut registry)
        .unwrap();
    assert!(!outcome.matched_nothing());
    assert_eq!(outcome.exit_status(&BatchAction::Validate), EXIT_SUCCESS);
}

#[test]
fn cancelled_run_stops_before_the_next_asset() {
    let cancel = CancelFlag::new();
    cancel.cancel();
    let mut registry = registry();
    let outcome = driver()
        .with_cancel_flag(cancel)
        .run(&BatchAction::Validate, &mut registry)
        .unwrap();
    assert!(outcome.cancelled);
    assert_eq!(outcome.assets_processed, 0);
}

// =============================================================================
// Node actions
// =============================================================================

#[test]
fn count_nodes_saves_nothing() {
    let mut registry = registry();
    let outcome = driver()
        .run(&BatchAction::FindNodes(NodeAction::Count), &mut registry)
        .unwrap();
    assert_eq!(outcome.result, ValidationResult::Invalid);
    assert!(outcome.saved_packages.is_empty());
    assert!(registry.saved().is_empty());
}

#[test]
fn count_collects_invalid_nodes_per_blueprint() {
    let registry = registry();
    let assets = AssetFilter::default().select(&registry);
    let mut registry = registry;
    let summary = nodes::run(&validator(), NodeAction::Count, &assets, &mut registry, &CancelFlag::new()).unwrap();

    assert_eq!(summary.invalid_nodes.len(), 1);
    assert_eq!(summary.total_nodes(), 2);
    let ids: Vec<_> = summary.invalid_nodes["/Game/Test/BP_Spawner.BP_Spawner"]
        .iter()
        .map(|h| h.node_id.as_str())
        .collect();
    assert_eq!(ids, vec!["bad", "ev"]);
}

#[test]
fn delete_nodes_removes_invalid_nodes_and_saves() {
    let mut registry = registry();
    let outcome = driver()
        .run(&BatchAction::FindNodes(NodeAction::Delete), &mut registry)
        .unwrap();

    assert_eq!(outcome.saved_packages, vec!["/Game/Test/BP_Spawner".to_string()]);
    assert_eq!(registry.saved(), ["/Game/Test/BP_Spawner.BP_Spawner".to_string()]);

    let saved = registry.blueprint("/Game/Test/BP_Spawner.BP_Spawner").unwrap();
    let ids: Vec<_> = saved.graphs[0].nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["ok"]);

    // Saved package now passes.
    let rerun = driver().run(&BatchAction::Validate, &mut registry).unwrap();
    assert_eq!(rerun.result, ValidationResult::Valid);
}

#[test]
fn refresh_nodes_reapplies_error_state_and_saves() {
    let mut registry = registry();
    driver()
        .run(&BatchAction::FindNodes(NodeAction::Refresh), &mut registry)
        .unwrap();

    let saved = registry.blueprint("/Game/Test/BP_Spawner.BP_Spawner").unwrap();
    assert!(saved.graphs[0].find_node("bad").unwrap().has_error());
    assert!(saved.graphs[0].find_node("ev").unwrap().has_error());
    assert!(!saved.graphs[0].find_node("ok").unwrap().has_error());
}

#[test]
fn refresh_drops_stale_errors_after_config_change() {
    let mut bp = spawner();
    let asset = bp.asset_data();
    let mut ctx = blueprint_validator::report::ValidationContext::new();
    validator().validate_blueprint(&mut bp, &asset, &mut ctx);
    assert!(bp.graphs[0].find_node("bad").unwrap().has_error());

    let lenient = blueprint_validator::validate::BlueprintGraphValidator::new(all_off());
    let result = nodes::refresh_blueprint(&lenient, &mut bp);
    assert_eq!(result, ValidationResult::Valid);
    assert!(bp.graphs[0].nodes.iter().all(|n| !n.has_error()));
}

fn handle(graph_index: usize, node_index: usize, node_id: &str) -> NodeHandle {
    NodeHandle {
        graph_index,
        node_index,
        node_id: node_id.into(),
    }
}

#[test]
fn delete_ignores_unknown_handles() {
    let mut bp = spawner();
    let handles = vec![
        handle(0, 1, "bad"),
        handle(7, 0, "ok"),
        handle(0, 5, "missing"),
        // Position 0 holds "ok", not "ev".
        handle(0, 0, "ev"),
    ];
    assert_eq!(nodes::delete_nodes(&mut bp, &handles), 1);
    let ids: Vec<_> = bp.graphs[0].nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["ok", "ev"]);
    assert_eq!(bp.graphs[0].revision(), 1);
}

#[test]
fn delete_several_nodes_from_one_graph_keeps_the_rest() {
    let mut bp = spawner();
    let handles = vec![handle(0, 1, "bad"), handle(0, 2, "ev"), handle(0, 1, "bad")];
    assert_eq!(nodes::delete_nodes(&mut bp, &handles), 2);
    let ids: Vec<_> = bp.graphs[0].nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["ok"]);
    assert_eq!(bp.graphs[0].revision(), 1);
}

#[test]
fn delete_removes_the_invalid_node_when_ids_collide() {
    let mut registry = MemoryRegistry::new();
    registry.insert_blueprint(blueprint(
        "BP_SharedIds",
        vec![event_graph(vec![call("n", "Actor", "SetOwner"), banned_call("n")])],
    ));
    driver()
        .run(&BatchAction::FindNodes(NodeAction::Delete), &mut registry)
        .unwrap();

    let saved = registry.blueprint("/Game/Test/BP_SharedIds.BP_SharedIds").unwrap();
    assert_eq!(saved.graphs[0].nodes.len(), 1);
    let survivor = &saved.graphs[0].nodes[0];
    assert!(!survivor.has_error());
    match &survivor.kind {
        NodeKind::CallFunction { function } => assert_eq!(function.member_name, "SetOwner"),
        other => panic!("unexpected node kind {:?}", other),
    }
}

// =============================================================================
// Directory registry
// =============================================================================

#[test]
fn directory_registry_round_trips_saved_blueprints() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("AI");
    std::fs::create_dir_all(&nested).unwrap();
    std::fs::write(
        nested.join("BP_EnemySpawner.json"),
        include_str!("fixtures/bp_enemy_spawner.json"),
    )
    .unwrap();
    std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
    std::fs::write(dir.path().join("readme.txt"), "ignored").unwrap();

    let mut registry = DirectoryRegistry::open(dir.path()).unwrap();
    let assets = registry.assets();
    assert_eq!(assets.len(), 1);
    assert_eq!(assets[0].object_path, "/Game/AI/BP_EnemySpawner.BP_EnemySpawner");

    let outcome = driver()
        .run(&BatchAction::FindNodes(NodeAction::Delete), &mut registry)
        .unwrap();
    assert_eq!(outcome.saved_packages, vec!["/Game/AI/BP_EnemySpawner".to_string()]);

    let reopened = DirectoryRegistry::open(dir.path()).unwrap();
    let object = reopened.load(&assets[0]).unwrap();
    let bp = object.as_blueprint().unwrap();
    let ids: Vec<_> = bp.graphs[0].nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["note", "cast-base", "branch"]);
}

#[test]
fn directory_registry_rejects_missing_root() {
    let dir = tempfile::tempdir().unwrap();
    assert!(DirectoryRegistry::open(dir.path().join("absent")).is_err());
}

// =============================================================================
// Stats
// =============================================================================

#[test]
fn stats_action_writes_csv() {
    let dir = tempfile::tempdir().unwrap();
    let out_file = dir.path().join("stats.csv");
    let mut registry = registry();
    let outcome = driver()
        .run(&BatchAction::BlueprintStats { out_file: out_file.clone() }, &mut registry)
        .unwrap();
    assert_eq!(outcome.assets_processed, 2);

    let csv = std::fs::read_to_string(&out_file).unwrap();
    insta::assert_snapshot!(csv.trim_end(), @r###"
    AssetName,PackageName,Graphs,Events,MacroGraphs,Functions,Components,Timelines,Variables,Nodes,Comments
    "BP_Clean","/Game/Test/BP_Clean","1","0","0","0","0","0","0","1","0"
    "BP_Spawner","/Game/Test/BP_Spawner","1","0","0","0","0","0","0","3","0"
    "###);
}

#[test]
fn events_column_counts_event_graphs() {
    let mut bp = spawner();
    bp.graphs.push(Graph::new("OnDamaged", GraphKind::Event, vec![]));
    bp.graphs.push(Graph::new("OnHealed", GraphKind::Event, vec![]));
    let stats = BlueprintStats::new(&bp, &bp.asset_data());
    assert_eq!(stats.graphs, 1);
    assert_eq!(stats.events, 2);
    assert_eq!(stats.nodes, 3);
}

#[test]
fn data_only_blueprints_report_zero_nodes() {
    let mut bp = blueprint("BP_Data", vec![event_graph(vec![])]);
    bp.components.push("Mesh".into());
    let stats = BlueprintStats::new(&bp, &bp.asset_data());
    assert_eq!(stats.graphs, 1);
    assert_eq!(stats.components, 1);
    assert_eq!(stats.nodes, 0);
}
