//! Offline lint for graph definitions
//!
//! The runner never consults this: a broken graph still runs and simply
//! ends (or loops) the way the transition rules dictate. Tooling uses it
//! to point authors at the mistakes before that happens.

use flowcore::{non_empty, GraphDefinition, GraphError, NodeKind, NodeRecord, NodeType};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Warning,
    Error,
}

/// What is wrong with a node or graph
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum IssueKind {
    EmptyGraph,
    StartNotStart { found: NodeType },
    EmptyNodeId { index: usize },
    DuplicateId,
    UnresolvedReference { field: String, target: String },
    Unreachable,
    IgnoredSequenceNext { next_id: String },
    MismatchedBranch { conditions: usize, targets: usize },
    LoopWithoutBody,
    MissingTriggerId,
    MissingDialogue,
    MissingSubFlow,
}

impl IssueKind {
    pub fn severity(&self) -> Severity {
        match self {
            IssueKind::EmptyNodeId { .. }
            | IssueKind::DuplicateId
            | IssueKind::UnresolvedReference { .. } => Severity::Error,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::EmptyGraph => write!(f, "graph has no nodes"),
            IssueKind::StartNotStart { found } => {
                write!(f, "first node should be a Start node, found {}", found)
            }
            IssueKind::EmptyNodeId { index } => write!(f, "node at index {} has no id", index),
            IssueKind::DuplicateId => write!(f, "id is used by more than one node"),
            IssueKind::UnresolvedReference { field, target } => {
                write!(f, "{} refers to unknown node '{}'", field, target)
            }
            IssueKind::Unreachable => write!(f, "not reachable from the start node"),
            IssueKind::IgnoredSequenceNext { next_id } => {
                write!(f, "sequence ignores its next_id '{}'", next_id)
            }
            IssueKind::MismatchedBranch { conditions, targets } => write!(
                f,
                "{} conditions but {} targets; extra entries are ignored",
                conditions, targets
            ),
            IssueKind::LoopWithoutBody => write!(f, "loop has no body and falls straight through"),
            IssueKind::MissingTriggerId => write!(f, "waits on an empty trigger id and can never wake"),
            IssueKind::MissingDialogue => write!(f, "no dialogue sequence; completes immediately"),
            IssueKind::MissingSubFlow => write!(f, "no nested graph; completes immediately"),
        }
    }
}

/// One finding, located by graph path (`outer/subflow_node/...`) and node id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LintIssue {
    pub severity: Severity,
    pub graph_path: String,
    pub node_id: Option<String>,
    pub kind: IssueKind,
}

impl fmt::Display for LintIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        match &self.node_id {
            Some(node_id) => write!(f, "{}: [{}] '{}': {}", level, self.graph_path, node_id, self.kind),
            None => write!(f, "{}: [{}] {}", level, self.graph_path, self.kind),
        }
    }
}

/// All findings for a graph and its nested graphs
#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphReport {
    issues: Vec<LintIssue>,
}

impl GraphReport {
    pub fn issues(&self) -> &[LintIssue] {
        &self.issues
    }

    pub fn errors(&self) -> impl Iterator<Item = &LintIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &LintIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Fail with every error joined into one message
    pub fn ensure_valid(&self) -> Result<(), GraphError> {
        if !self.has_errors() {
            return Ok(());
        }
        let message = self
            .errors()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(GraphError::Invalid(message))
    }

    fn push(&mut self, graph_path: &str, node_id: Option<&str>, kind: IssueKind) {
        self.issues.push(LintIssue {
            severity: kind.severity(),
            graph_path: graph_path.to_string(),
            node_id: node_id.map(str::to_string),
            kind,
        });
    }
}

/// Lint a graph, recursing into SubFlow graphs
pub fn validate(graph: &GraphDefinition) -> GraphReport {
    let mut report = GraphReport::default();
    let root = if graph.id.is_empty() { "(unnamed)" } else { graph.id.as_str() };
    validate_into(graph, root, &mut report);
    report
}

fn validate_into(graph: &GraphDefinition, path: &str, report: &mut GraphReport) {
    let Some(start) = graph.start_node() else {
        report.push(path, None, IssueKind::EmptyGraph);
        return;
    };

    if start.node_type() != NodeType::Start {
        report.push(path, Some(&start.id), IssueKind::StartNotStart {
            found: start.node_type(),
        });
    }

    // Same id resolution as the runner: later records shadow earlier ones
    let mut winners: HashMap<&str, usize> = HashMap::new();
    let mut reported_dupes: HashSet<&str> = HashSet::new();

    for (i, record) in graph.nodes.iter().enumerate() {
        if record.id.is_empty() {
            report.push(path, None, IssueKind::EmptyNodeId { index: i });
            continue;
        }
        if winners.insert(record.id.as_str(), i).is_some() && reported_dupes.insert(record.id.as_str()) {
            report.push(path, Some(&record.id), IssueKind::DuplicateId);
        }
    }

    let mut flow: DiGraph<usize, &'static str> = DiGraph::new();
    let mut by_id: HashMap<&str, NodeIndex> = HashMap::new();
    for (i, record) in graph.nodes.iter().enumerate() {
        if winners.get(record.id.as_str()) == Some(&i) {
            by_id.insert(record.id.as_str(), flow.add_node(i));
        }
    }

    for (i, record) in graph.nodes.iter().enumerate() {
        let Some(&from) = by_id.get(record.id.as_str()) else {
            continue;
        };
        if flow[from] != i {
            // Shadowed duplicate; already reported
            continue;
        }

        for (field, target) in record.references() {
            match by_id.get(target) {
                Some(&to) => {
                    flow.add_edge(from, to, field);
                }
                None => report.push(path, Some(&record.id), IssueKind::UnresolvedReference {
                    field: field.to_string(),
                    target: target.to_string(),
                }),
            }
        }

        lint_payload(record, path, report);
    }

    if let Some(&entry) = by_id.get(start.id.as_str()) {
        let mut reachable = HashSet::new();
        let mut dfs = Dfs::new(&flow, entry);
        while let Some(nx) = dfs.next(&flow) {
            reachable.insert(nx);
        }

        for nx in flow.node_indices() {
            if !reachable.contains(&nx) {
                let record = &graph.nodes[flow[nx]];
                report.push(path, Some(&record.id), IssueKind::Unreachable);
            }
        }
    }
}

fn lint_payload(
    record: &NodeRecord,
    path: &str,
    report: &mut GraphReport,
) {
    let id = Some(record.id.as_str());
    match &record.kind {
        NodeKind::Sequence { .. } => {
            if let Some(next_id) = record.next() {
                report.push(path, id, IssueKind::IgnoredSequenceNext {
                    next_id: next_id.to_string(),
                });
            }
        }
        NodeKind::Branch { condition_ids, next_ids } => {
            if condition_ids.len() != next_ids.len() {
                report.push(path, id, IssueKind::MismatchedBranch {
                    conditions: condition_ids.len(),
                    targets: next_ids.len(),
                });
            }
        }
        NodeKind::Loop { body_id, .. } => {
            if non_empty(body_id.as_deref()).is_none() {
                report.push(path, id, IssueKind::LoopWithoutBody);
            }
        }
        NodeKind::WaitForTrigger { trigger_id } => {
            if trigger_id.is_empty() {
                report.push(path, id, IssueKind::MissingTriggerId);
            }
        }
        NodeKind::Dialogue { sequence, .. } => {
            if sequence.as_ref().map_or(true, |s| s.as_str().is_empty()) {
                report.push(path, id, IssueKind::MissingDialogue);
            }
        }
        NodeKind::SubFlow { graph: nested } => match nested {
            Some(nested) => {
                let nested_path = format!("{}/{}", path, record.id);
                validate_into(nested, &nested_path, report);
            }
            None => report.push(path, id, IssueKind::MissingSubFlow),
        },
        NodeKind::Start | NodeKind::Delay { .. } | NodeKind::Objective { .. } => {}
    }

}
