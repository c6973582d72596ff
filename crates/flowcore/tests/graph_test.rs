// crates/flowcore/tests/graph_test.rs

use flowcore::{
    non_empty, ActorSlot, EventBus, FlowError, GraphDefinition, NodeKind, NodeRecord, NodeType,
    ObjectiveAction, RunEvent, SequenceRef,
};
use uuid::Uuid;

const SCENE_JSON: &str = r#"{
    "id": "scene",
    "nodes": [
        { "id": "Start", "type": "Start", "next_id": "pause" },
        { "id": "pause", "type": "Delay", "next_id": "talk" },
        { "id": "talk", "type": "Dialogue", "sequence": "intro", "next_id": "pick" },
        { "id": "pick", "type": "Branch", "condition_ids": ["has_key"], "next_ids": ["goal"], "next_id": "" },
        { "id": "goal", "type": "Objective", "objective_id": "find_key", "action": "Complete" },
        {
            "id": "sub",
            "type": "SubFlow",
            "graph": { "id": "inner", "nodes": [{ "id": "Start", "type": "Start" }] }
        }
    ],
    "actor_slots": [
        { "id": "Guard", "prefab": "Npc/Guard", "local_position": [1.0, 0.0, 2.0] },
        { "id": "Cart", "spawn_on_start": false }
    ]
}"#;

#[test]
fn test_parse_graph_json() {
    let graph = GraphDefinition::from_json_str(SCENE_JSON).unwrap();

    assert_eq!(graph.id, "scene");
    assert_eq!(graph.nodes.len(), 6);
    assert_eq!(graph.start_node().map(|n| n.node_type()), Some(NodeType::Start));
    assert_eq!(graph.start_node().and_then(|n| n.next()), Some("pause"));

    // Defaults fill in omitted payload fields
    assert_eq!(graph.node("pause").unwrap().kind, NodeKind::Delay { seconds: 1.0 });
    assert_eq!(
        graph.node("talk").unwrap().kind,
        NodeKind::Dialogue {
            sequence: Some(SequenceRef::from("intro")),
            wait_for_completion: true,
        }
    );
    assert_eq!(
        graph.node("goal").unwrap().kind,
        NodeKind::Objective {
            objective_id: "find_key".to_string(),
            action: ObjectiveAction::Complete,
        }
    );

    // Empty next_id reads as no successor
    assert_eq!(graph.node("pick").unwrap().next(), None);

    match &graph.node("sub").unwrap().kind {
        NodeKind::SubFlow { graph: Some(inner) } => assert_eq!(inner.id, "inner"),
        other => panic!("unexpected kind {:?}", other),
    }
}

#[test]
fn test_parse_actor_slots() {
    let graph = GraphDefinition::from_json_str(SCENE_JSON).unwrap();

    let guard = &graph.actor_slots[0];
    assert_eq!(guard.prefab.as_deref(), Some("Npc/Guard"));
    assert_eq!(guard.local_position, [1.0, 0.0, 2.0]);
    assert!(guard.spawn_on_start);

    let spawned: Vec<_> = graph.auto_spawn_slots().map(|s| s.id.as_str()).collect();
    assert_eq!(spawned, vec!["Guard"]);
}

#[test]
fn test_parse_rejects_unknown_node_type() {
    let json = r#"{ "id": "bad", "nodes": [{ "id": "Start", "type": "Teleport" }] }"#;

    let err = GraphDefinition::from_json_str(json).unwrap_err();
    assert!(matches!(err, FlowError::Serialization(_)));
}

#[test]
fn test_builder_matches_json_form() {
    let graph = GraphDefinition::new("built")
        .with_node(NodeRecord::start("Start").with_next("loop"))
        .with_node(NodeRecord::looped("loop", "body", 2).with_next("seq"))
        .with_node(NodeRecord::delay("body", 0.5).with_next("loop"))
        .with_node(NodeRecord::sequence("seq", ["a", "b"]))
        .with_node(NodeRecord::wait_for_trigger("a", "lever"))
        .with_node(NodeRecord::dialogue("b", "outro", false))
        .with_actor_slot(ActorSlot::new("Gate").with_property("locked", true).manual_spawn());

    let json = graph.to_json_pretty().unwrap();
    assert!(json.contains(r#""type": "Loop""#));

    let parsed = GraphDefinition::from_json_str(&json).unwrap();
    assert_eq!(parsed, graph);
    assert_eq!(parsed.auto_spawn_slots().count(), 0);
}

#[test]
fn test_references_list_every_target() {
    let branch = NodeRecord::branch("br", [("c1", "x"), ("c2", ""), ("c3", "y")]).with_next("z");
    assert_eq!(
        branch.references(),
        vec![("next_id", "z"), ("next_ids", "x"), ("next_ids", "y")]
    );

    let looped = NodeRecord::looped("loop", "body", 0);
    assert_eq!(looped.references(), vec![("body_id", "body")]);

    let seq = NodeRecord::sequence("seq", ["a", "", "b"]);
    assert_eq!(seq.references(), vec![("step_ids", "a"), ("step_ids", "b")]);

    assert!(NodeRecord::start("Start").references().is_empty());
}

#[test]
fn test_node_lookup_and_non_empty() {
    let graph = GraphDefinition::new("g")
        .with_node(NodeRecord::start("Start"))
        .with_node(NodeRecord::delay("", 1.0));

    assert!(graph.node("").is_none());
    assert!(graph.node("missing").is_none());
    assert_eq!(graph.node_ids().collect::<Vec<_>>(), vec!["Start", ""]);

    assert_eq!(non_empty(Some("a")), Some("a"));
    assert_eq!(non_empty(Some("")), None);
    assert_eq!(non_empty(None), None);

    assert!(GraphDefinition::new("empty").start_node().is_none());
}

#[test]
fn test_node_type_names() {
    assert_eq!(NodeType::ALL.len(), 9);
    assert_eq!(NodeType::WaitForTrigger.to_string(), "WaitForTrigger");
    assert!(NodeType::ALL.iter().all(|t| !t.description().is_empty()));
}

#[test]
fn test_event_bus_delivers_with_depth() {
    let bus = EventBus::new(16);
    let mut rx = bus.subscribe();

    let run_id = Uuid::new_v4();
    let emitter = bus.create_emitter(run_id);
    let nested = emitter.nested(Uuid::new_v4());

    emitter.run_started("outer");
    nested.node_entered("Start", NodeType::Start, 3);

    match rx.try_recv().unwrap() {
        RunEvent::RunStarted { graph_id, depth, run_id: id, .. } => {
            assert_eq!(graph_id, "outer");
            assert_eq!(depth, 0);
            assert_eq!(id, run_id);
        }
        other => panic!("unexpected event {:?}", other),
    }

    let event = rx.try_recv().unwrap();
    assert_eq!(event.depth(), 1);
    assert_ne!(event.run_id(), run_id);
    assert!(matches!(event, RunEvent::NodeEntered { tick: 3, .. }));
}

#[test]
fn test_emit_without_subscribers_is_silent() {
    let bus = EventBus::new(0);
    let emitter = bus.create_emitter(Uuid::new_v4());

    emitter.run_finished("nobody_listening", 5);
}
