//! Node variants
//!
//! Every node kind is one arm of the closed [`NodeState`] enum; the
//! `enter` / `tick` / `exit` / `successor_id` contract is a `match` over it.

mod control;
mod subflow;
mod timing;
mod world;

pub use control::{BranchNode, LoopNode, SequenceNode};
pub use subflow::SubFlowNode;
pub use timing::{DelayNode, WaitForTriggerNode};
pub use world::{DialogueNode, ObjectiveNode};

use crate::{GraphRunner, ReturnStack, TriggerRegistry};
use flowcore::{non_empty, EventEmitter, NodeKind, NodeRecord, NodeType, World};
use std::fmt;
use std::sync::Arc;

/// Position of a node instance in its runner's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub(crate) usize);

impl NodeIndex {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Runner-owned state a node may touch while it holds control
pub(crate) struct NodeCx<'a> {
    pub this: NodeIndex,
    pub world: Option<&'a Arc<dyn World>>,
    pub triggers: &'a mut TriggerRegistry,
    pub returns: &'a mut ReturnStack,
    pub events: Option<&'a EventEmitter>,
}

/// Per-variant runtime state
#[derive(Debug)]
pub enum NodeState {
    Start,
    Dialogue(DialogueNode),
    Delay(DelayNode),
    WaitForTrigger(WaitForTriggerNode),
    Objective(ObjectiveNode),
    SubFlow(SubFlowNode),
    Branch(BranchNode),
    Sequence(SequenceNode),
    Loop(LoopNode),
}

/// One node instance: static identity plus mutable per-run state
///
/// Built once when a runner starts and reused on every re-entry.
#[derive(Debug)]
pub struct FlowNode {
    id: String,
    next_id: Option<String>,
    state: NodeState,
}

impl FlowNode {
    pub fn from_record(record: &NodeRecord) -> Self {
        let state = match &record.kind {
            NodeKind::Start => NodeState::Start,
            NodeKind::Dialogue { sequence, wait_for_completion } => {
                NodeState::Dialogue(DialogueNode::new(sequence.clone(), *wait_for_completion))
            }
            NodeKind::Delay { seconds } => NodeState::Delay(DelayNode::new(*seconds)),
            NodeKind::WaitForTrigger { trigger_id } => {
                NodeState::WaitForTrigger(WaitForTriggerNode::new(trigger_id.clone()))
            }
            NodeKind::Objective { objective_id, action } => {
                NodeState::Objective(ObjectiveNode::new(objective_id.clone(), *action))
            }
            NodeKind::SubFlow { graph } => NodeState::SubFlow(SubFlowNode::new(graph.clone())),
            NodeKind::Branch { condition_ids, next_ids } => {
                NodeState::Branch(BranchNode::new(condition_ids.clone(), next_ids.clone()))
            }
            NodeKind::Sequence { step_ids } => {
                NodeState::Sequence(SequenceNode::new(step_ids.clone()))
            }
            NodeKind::Loop { body_id, iteration_limit } => {
                NodeState::Loop(LoopNode::new(body_id.clone(), *iteration_limit))
            }
        };
        
        Self {
            id: record.id.clone(),
            next_id: record.next().map(str::to_string),
            state,
        }
    }
    
    pub fn id(&self) -> &str {
        &self.id
    }
    
    pub fn node_type(&self) -> NodeType {
        match &self.state {
            NodeState::Start => NodeType::Start,
            NodeState::Dialogue(_) => NodeType::Dialogue,
            NodeState::Delay(_) => NodeType::Delay,
            NodeState::WaitForTrigger(_) => NodeType::WaitForTrigger,
            NodeState::Objective(_) => NodeType::Objective,
            NodeState::SubFlow(_) => NodeType::SubFlow,
            NodeState::Branch(_) => NodeType::Branch,
            NodeState::Sequence(_) => NodeType::Sequence,
            NodeState::Loop(_) => NodeType::Loop,
        }
    }
    
    pub fn state(&self) -> &NodeState {
        &self.state
    }
    
    /// Static successor from the record
    pub fn next_id(&self) -> Option<&str> {
        non_empty(self.next_id.as_deref())
    }
    
    /// Called each time control arrives at this node
    pub(crate) fn enter(&mut self, cx: &mut NodeCx<'_>) {
        match &mut self.state {
            NodeState::Start | NodeState::Objective(_) => {}
            NodeState::Dialogue(node) => node.enter(),
            NodeState::Delay(node) => node.enter(),
            NodeState::WaitForTrigger(node) => node.enter(cx),
            NodeState::SubFlow(node) => node.enter(cx),
            NodeState::Branch(node) => node.enter(cx),
            NodeState::Sequence(node) => node.enter(cx),
            NodeState::Loop(node) => node.enter(),
        }
    }
    
    /// Advance by `dt` seconds; true once this visit's work is complete
    pub(crate) fn tick(&mut self, dt: f32, cx: &mut NodeCx<'_>) -> bool {
        match &mut self.state {
            NodeState::Start => true,
            NodeState::Dialogue(node) => node.tick(cx),
            NodeState::Delay(node) => node.tick(dt),
            NodeState::WaitForTrigger(node) => node.tick(),
            NodeState::Objective(node) => node.tick(cx),
            NodeState::SubFlow(node) => node.tick(dt),
            NodeState::Branch(_) | NodeState::Sequence(_) | NodeState::Loop(_) => true,
        }
    }
    
    /// Called once when control leaves this node
    pub(crate) fn exit(&mut self, cx: &mut NodeCx<'_>) {
        match &mut self.state {
            NodeState::WaitForTrigger(node) => node.exit(cx),
            NodeState::SubFlow(node) => node.exit(),
            NodeState::Sequence(node) => node.exit(cx),
            _ => {}
        }
    }
    
    /// Where control goes once `tick` has returned true
    pub fn successor_id(&self) -> Option<&str> {
        match &self.state {
            NodeState::Branch(node) => node.successor_id().or(self.next_id()),
            NodeState::Sequence(node) => node.successor_id(),
            NodeState::Loop(node) => node.successor_id().or(self.next_id()),
            _ => self.next_id(),
        }
    }
    
    /// Mark a waiting node fired. Returns false for non-waiting variants.
    pub(crate) fn signal(&mut self) -> bool {
        match &mut self.state {
            NodeState::WaitForTrigger(node) => {
                node.signal();
                true
            }
            _ => false,
        }
    }
    
    /// Nested runner owned by an active SubFlow node
    pub fn nested_runner(&self) -> Option<&GraphRunner> {
        match &self.state {
            NodeState::SubFlow(node) => node.runner(),
            _ => None,
        }
    }
    
    /// One-line human readable status, for tooling only
    pub fn status(&self, world: Option<&Arc<dyn World>>) -> String {
        let id = &self.id;
        match &self.state {
            NodeState::Start => format!("Start '{}'", id),
            NodeState::Dialogue(node) => format!("Dialogue '{}': {}", id, node.status(world)),
            NodeState::Delay(node) => format!("Delay '{}': {}", id, node.status()),
            NodeState::WaitForTrigger(node) => format!("WaitForTrigger '{}': {}", id, node.status()),
            NodeState::Objective(node) => format!("Objective '{}': {}", id, node.status()),
            NodeState::SubFlow(node) => format!("SubFlow '{}': {}", id, node.status()),
            NodeState::Branch(node) => format!("Branch '{}': {}", id, node.status()),
            NodeState::Sequence(node) => format!("Sequence '{}': {}", id, node.status()),
            NodeState::Loop(node) => format!("Loop '{}': {}", id, node.status()),
        }
    }
}
