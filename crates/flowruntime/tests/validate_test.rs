// crates/flowruntime/tests/validate_test.rs

use flowcore::{GraphDefinition, GraphError, NodeRecord, NodeType, ObjectiveAction};
use flowruntime::{validate, IssueKind, Severity};

fn kinds_for<'a>(report: &'a flowruntime::GraphReport, node_id: &str) -> Vec<&'a IssueKind> {
    report
        .issues()
        .iter()
        .filter(|i| i.node_id.as_deref() == Some(node_id))
        .map(|i| &i.kind)
        .collect()
}

#[test]
fn test_clean_graph_has_no_issues() {
    let graph = GraphDefinition::new("clean")
        .with_node(NodeRecord::start("Start").with_next("talk"))
        .with_node(NodeRecord::dialogue("talk", "intro", true).with_next("seq"))
        .with_node(NodeRecord::sequence("seq", ["loop", "goal"]))
        .with_node(NodeRecord::looped("loop", "pause", 2))
        .with_node(NodeRecord::delay("pause", 1.0).with_next("loop"))
        .with_node(NodeRecord::objective("goal", "g", ObjectiveAction::Complete));

    let report = validate(&graph);

    assert!(report.is_clean(), "unexpected issues: {:?}", report.issues());
    assert!(report.ensure_valid().is_ok());
}

#[test]
fn test_empty_graph_is_warned() {
    let report = validate(&GraphDefinition::new("empty"));

    assert_eq!(report.issues().len(), 1);
    assert_eq!(report.issues()[0].kind, IssueKind::EmptyGraph);
    assert!(!report.has_errors());
}

#[test]
fn test_unresolved_reference_is_an_error() {
    let graph = GraphDefinition::new("dangling")
        .with_node(NodeRecord::start("Start").with_next("br"))
        .with_node(NodeRecord::branch("br", [("c", "ghost")]));

    let report = validate(&graph);

    assert!(report.has_errors());
    assert_eq!(
        kinds_for(&report, "br"),
        vec![&IssueKind::UnresolvedReference {
            field: "next_ids".to_string(),
            target: "ghost".to_string(),
        }]
    );

    match report.ensure_valid() {
        Err(GraphError::Invalid(message)) => assert!(message.contains("ghost")),
        other => panic!("expected invalid graph, got {:?}", other),
    }
}

#[test]
fn test_duplicates_and_empty_ids() {
    let graph = GraphDefinition::new("dupes")
        .with_node(NodeRecord::start("Start").with_next("x"))
        .with_node(NodeRecord::delay("x", 1.0))
        .with_node(NodeRecord::delay("x", 2.0))
        .with_node(NodeRecord::delay("x", 3.0))
        .with_node(NodeRecord::delay("", 1.0));

    let report = validate(&graph);

    assert_eq!(kinds_for(&report, "x"), vec![&IssueKind::DuplicateId]);
    assert!(report
        .issues()
        .iter()
        .any(|i| i.kind == IssueKind::EmptyNodeId { index: 4 }));
    assert_eq!(report.errors().count(), 2);
}

#[test]
fn test_unreachable_nodes_are_warned() {
    let graph = GraphDefinition::new("islands")
        .with_node(NodeRecord::start("Start").with_next("a"))
        .with_node(NodeRecord::delay("a", 1.0))
        .with_node(NodeRecord::delay("island", 1.0).with_next("a"));

    let report = validate(&graph);

    assert_eq!(kinds_for(&report, "island"), vec![&IssueKind::Unreachable]);
    assert!(kinds_for(&report, "a").is_empty());
    assert!(!report.has_errors());
}

#[test]
fn test_payload_warnings() {
    let mut silent = NodeRecord::dialogue("silent", "", true);
    silent.next_id = Some("loop".to_string());

    let mut graph = GraphDefinition::new("payloads")
        .with_node(NodeRecord::delay("first", 1.0).with_next("seq"))
        .with_node(NodeRecord::sequence("seq", ["br"]).with_next("wait"))
        .with_node(NodeRecord::branch("br", [("c", "silent")]).with_next("wait"))
        .with_node(NodeRecord::wait_for_trigger("wait", "").with_next("silent"))
        .with_node(silent)
        .with_node(NodeRecord::looped("loop", "", 1));

    // Extra condition with no matching target
    if let flowcore::NodeKind::Branch { condition_ids, .. } = &mut graph.nodes[2].kind {
        condition_ids.push("orphan".to_string());
    }

    let report = validate(&graph);

    assert!(!report.has_errors(), "{:?}", report.issues());
    assert_eq!(
        kinds_for(&report, "first"),
        vec![&IssueKind::StartNotStart { found: NodeType::Delay }]
    );
    assert_eq!(
        kinds_for(&report, "seq"),
        vec![&IssueKind::IgnoredSequenceNext { next_id: "wait".to_string() }]
    );
    assert_eq!(
        kinds_for(&report, "br"),
        vec![&IssueKind::MismatchedBranch { conditions: 2, targets: 1 }]
    );
    assert_eq!(kinds_for(&report, "wait"), vec![&IssueKind::MissingTriggerId]);
    assert_eq!(kinds_for(&report, "silent"), vec![&IssueKind::MissingDialogue]);
    assert_eq!(kinds_for(&report, "loop"), vec![&IssueKind::LoopWithoutBody]);
    assert!(report.warnings().all(|i| i.severity == Severity::Warning));
}

#[test]
fn test_sub_flow_graphs_are_linted_with_path() {
    let inner = GraphDefinition::new("inner")
        .with_node(NodeRecord::start("Start").with_next("missing"));
    let mut none = NodeRecord::sub_flow("none", GraphDefinition::new("unused"));
    none.kind = flowcore::NodeKind::SubFlow { graph: None };

    let graph = GraphDefinition::new("outer")
        .with_node(NodeRecord::start("Start").with_next("sub"))
        .with_node(NodeRecord::sub_flow("sub", inner).with_next("none"))
        .with_node(none);

    let report = validate(&graph);

    let nested: Vec<_> = report.errors().collect();
    assert_eq!(nested.len(), 1);
    assert_eq!(nested[0].graph_path, "outer/sub");
    assert_eq!(nested[0].node_id.as_deref(), Some("Start"));
    assert_eq!(
        nested[0].to_string(),
        "error: [outer/sub] 'Start': next_id refers to unknown node 'missing'"
    );

    assert_eq!(kinds_for(&report, "none"), vec![&IssueKind::MissingSubFlow]);
}
