use crate::{FlowError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Complete flow graph definition
///
/// Produced by authoring tooling and handed to a runner as an already
/// parsed, immutable structure. The record at index 0 is the start node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDefinition {
    pub id: String,
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub actor_slots: Vec<ActorSlot>,
}

impl GraphDefinition {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            nodes: Vec::new(),
            actor_slots: Vec::new(),
        }
    }

    pub fn with_node(mut self, node: NodeRecord) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn with_actor_slot(mut self, slot: ActorSlot) -> Self {
        self.actor_slots.push(slot);
        self
    }

    /// The canonical start record (index 0), if the graph has any nodes
    pub fn start_node(&self) -> Option<&NodeRecord> {
        self.nodes.first()
    }

    /// First record carrying the given id
    pub fn node(&self, id: &str) -> Option<&NodeRecord> {
        if id.is_empty() {
            return None;
        }
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.id.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Actor slots an external spawner should create when the flow starts
    pub fn auto_spawn_slots(&self) -> impl Iterator<Item = &ActorSlot> {
        self.actor_slots.iter().filter(|s| s.spawn_on_start)
    }

    /// Parse a graph from its JSON form
    pub fn from_json_str(json: &str) -> Result<Self> {
        let graph: GraphDefinition = serde_json::from_str(json)?;
        tracing::debug!("Parsed graph '{}' with {} nodes", graph.id, graph.nodes.len());
        Ok(graph)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(FlowError::from)
    }
}

/// One node of a graph: id, optional linear successor and typed payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_id: Option<String>,
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl NodeRecord {
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            next_id: None,
            kind,
        }
    }

    pub fn start(id: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Start)
    }

    pub fn dialogue(
        id: impl Into<String>,
        sequence: impl Into<SequenceRef>,
        wait_for_completion: bool,
    ) -> Self {
        Self::new(id, NodeKind::Dialogue {
            sequence: Some(sequence.into()),
            wait_for_completion,
        })
    }

    pub fn delay(id: impl Into<String>, seconds: f32) -> Self {
        Self::new(id, NodeKind::Delay { seconds })
    }

    pub fn wait_for_trigger(id: impl Into<String>, trigger_id: impl Into<String>) -> Self {
        Self::new(id, NodeKind::WaitForTrigger {
            trigger_id: trigger_id.into(),
        })
    }

    pub fn objective(
        id: impl Into<String>,
        objective_id: impl Into<String>,
        action: ObjectiveAction,
    ) -> Self {
        Self::new(id, NodeKind::Objective {
            objective_id: objective_id.into(),
            action,
        })
    }

    pub fn sub_flow(id: impl Into<String>, graph: GraphDefinition) -> Self {
        Self::new(id, NodeKind::SubFlow {
            graph: Some(Arc::new(graph)),
        })
    }

    /// Branch over `(condition_id, next_id)` options, checked in order
    pub fn branch<C, N>(id: impl Into<String>, options: impl IntoIterator<Item = (C, N)>) -> Self
    where
        C: Into<String>,
        N: Into<String>,
    {
        let (condition_ids, next_ids): (Vec<String>, Vec<String>) = options
            .into_iter()
            .map(|(c, n)| (c.into(), n.into()))
            .unzip();
        Self::new(id, NodeKind::Branch {
            condition_ids,
            next_ids,
        })
    }

    pub fn sequence<S: Into<String>>(
        id: impl Into<String>,
        step_ids: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::new(id, NodeKind::Sequence {
            step_ids: step_ids.into_iter().map(Into::into).collect(),
        })
    }

    pub fn looped(id: impl Into<String>, body_id: impl Into<String>, iteration_limit: u32) -> Self {
        Self::new(id, NodeKind::Loop {
            body_id: Some(body_id.into()),
            iteration_limit,
        })
    }

    pub fn with_next(mut self, next_id: impl Into<String>) -> Self {
        self.next_id = Some(next_id.into());
        self
    }

    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    /// Static successor, with an empty string treated as absent
    pub fn next(&self) -> Option<&str> {
        non_empty(self.next_id.as_deref())
    }

    /// Every node id this record refers to, paired with the field it sits in
    pub fn references(&self) -> Vec<(&'static str, &str)> {
        let mut refs = Vec::new();
        if let Some(next) = self.next() {
            refs.push(("next_id", next));
        }
        match &self.kind {
            NodeKind::Branch { next_ids, .. } => {
                refs.extend(next_ids.iter().filter(|n| !n.is_empty()).map(|n| ("next_ids", n.as_str())));
            }
            NodeKind::Sequence { step_ids } => {
                refs.extend(step_ids.iter().filter(|s| !s.is_empty()).map(|s| ("step_ids", s.as_str())));
            }
            NodeKind::Loop { body_id, .. } => {
                if let Some(body) = non_empty(body_id.as_deref()) {
                    refs.push(("body_id", body));
                }
            }
            _ => {}
        }
        refs
    }
}

/// Variant payloads, tagged by `type` in the serialized form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    Start,
    Dialogue {
        #[serde(default)]
        sequence: Option<SequenceRef>,
        #[serde(default = "default_wait_for_completion")]
        wait_for_completion: bool,
    },
    Delay {
        #[serde(default = "default_delay_seconds")]
        seconds: f32,
    },
    WaitForTrigger {
        #[serde(default)]
        trigger_id: String,
    },
    Objective {
        #[serde(default)]
        objective_id: String,
        #[serde(default)]
        action: ObjectiveAction,
    },
    SubFlow {
        #[serde(default)]
        graph: Option<Arc<GraphDefinition>>,
    },
    Branch {
        #[serde(default)]
        condition_ids: Vec<String>,
        #[serde(default)]
        next_ids: Vec<String>,
    },
    Sequence {
        #[serde(default)]
        step_ids: Vec<String>,
    },
    Loop {
        #[serde(default)]
        body_id: Option<String>,
        /// 0 = unbounded
        #[serde(default)]
        iteration_limit: u32,
    },
}

fn default_wait_for_completion() -> bool {
    true
}

fn default_delay_seconds() -> f32 {
    1.0
}

impl NodeKind {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Start => NodeType::Start,
            NodeKind::Dialogue { .. } => NodeType::Dialogue,
            NodeKind::Delay { .. } => NodeType::Delay,
            NodeKind::WaitForTrigger { .. } => NodeType::WaitForTrigger,
            NodeKind::Objective { .. } => NodeType::Objective,
            NodeKind::SubFlow { .. } => NodeType::SubFlow,
            NodeKind::Branch { .. } => NodeType::Branch,
            NodeKind::Sequence { .. } => NodeType::Sequence,
            NodeKind::Loop { .. } => NodeType::Loop,
        }
    }
}

/// Payload-free node type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Start,
    Dialogue,
    Delay,
    WaitForTrigger,
    Objective,
    SubFlow,
    Branch,
    Sequence,
    Loop,
}

impl NodeType {
    pub const ALL: [NodeType; 9] = [
        NodeType::Start,
        NodeType::Dialogue,
        NodeType::Delay,
        NodeType::WaitForTrigger,
        NodeType::Objective,
        NodeType::SubFlow,
        NodeType::Branch,
        NodeType::Sequence,
        NodeType::Loop,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Start => "Start",
            NodeType::Dialogue => "Dialogue",
            NodeType::Delay => "Delay",
            NodeType::WaitForTrigger => "WaitForTrigger",
            NodeType::Objective => "Objective",
            NodeType::SubFlow => "SubFlow",
            NodeType::Branch => "Branch",
            NodeType::Sequence => "Sequence",
            NodeType::Loop => "Loop",
        }
    }

    /// Short description for tooling
    pub fn description(&self) -> &'static str {
        match self {
            NodeType::Start => "Entry point, completes immediately",
            NodeType::Dialogue => "Plays a dialogue sequence, optionally waiting for it to end",
            NodeType::Delay => "Waits for a number of seconds",
            NodeType::WaitForTrigger => "Blocks until a named trigger is signalled",
            NodeType::Objective => "Activates or completes an objective",
            NodeType::SubFlow => "Runs a nested graph to completion",
            NodeType::Branch => "Follows the first option whose condition holds",
            NodeType::Sequence => "Runs each step chain in order, resuming via the return stack",
            NodeType::Loop => "Re-enters its body until the iteration limit is reached",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectiveAction {
    #[default]
    Activate,
    Complete,
}

/// Reference to a dialogue sequence owned by the host
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SequenceRef(pub String);

impl SequenceRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SequenceRef {
    fn from(s: &str) -> Self {
        SequenceRef(s.to_string())
    }
}

impl From<String> for SequenceRef {
    fn from(s: String) -> Self {
        SequenceRef(s)
    }
}

impl fmt::Display for SequenceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Actor the scenario can bind or spawn. Opaque to the runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSlot {
    pub id: String,
    #[serde(default)]
    pub prefab: Option<String>,
    #[serde(default)]
    pub local_position: [f32; 3],
    #[serde(default)]
    pub local_euler: [f32; 3],
    #[serde(default = "default_spawn_on_start")]
    pub spawn_on_start: bool,
    /// Free-form spawn parameters
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

fn default_spawn_on_start() -> bool {
    true
}

impl ActorSlot {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            prefab: None,
            local_position: [0.0; 3],
            local_euler: [0.0; 3],
            spawn_on_start: true,
            properties: serde_json::Map::new(),
        }
    }

    pub fn with_prefab(mut self, prefab: impl Into<String>) -> Self {
        self.prefab = Some(prefab.into());
        self
    }

    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.local_position = [x, y, z];
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn manual_spawn(mut self) -> Self {
        self.spawn_on_start = false;
        self
    }
}

/// Treat an empty id the same as a missing one
pub fn non_empty(id: Option<&str>) -> Option<&str> {
    id.filter(|s| !s.is_empty())
}
