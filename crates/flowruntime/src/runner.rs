use crate::nodes::{FlowNode, NodeCx, NodeIndex};
use crate::{ReturnStack, TriggerRegistry};
use flowcore::{EventEmitter, GraphDefinition, NodeType, RunId, World};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Drives one run of a flow graph, one node transition per tick
///
/// The runner owns every node instance (an arena addressed by
/// [`NodeIndex`]), the trigger registry and the return stack of its run.
/// Dropping it abandons the run, including any nested SubFlow runs.
pub struct GraphRunner {
    run_id: RunId,
    graph: Arc<GraphDefinition>,
    world: Option<Arc<dyn World>>,
    nodes: Vec<FlowNode>,
    lookup: HashMap<String, NodeIndex>,
    current: Option<NodeIndex>,
    triggers: TriggerRegistry,
    returns: ReturnStack,
    events: Option<EventEmitter>,
    ticks: u64,
    enters: u64,
}

impl GraphRunner {
    /// Build the node set and enter the start node
    pub fn new(graph: Arc<GraphDefinition>, world: Option<Arc<dyn World>>) -> Self {
        Self::with_events(graph, world, None)
    }

    /// Like [`GraphRunner::new`], reporting progress through `events`
    pub fn with_events(
        graph: Arc<GraphDefinition>,
        world: Option<Arc<dyn World>>,
        events: Option<EventEmitter>,
    ) -> Self {
        let run_id = events.as_ref().map(|e| e.run_id()).unwrap_or_else(Uuid::new_v4);

        let mut runner = Self {
            run_id,
            graph,
            world,
            nodes: Vec::new(),
            lookup: HashMap::new(),
            current: None,
            triggers: TriggerRegistry::new(),
            returns: ReturnStack::new(),
            events,
            ticks: 0,
            enters: 0,
        };

        runner.build_nodes();

        if let Some(events) = &runner.events {
            events.run_started(&runner.graph.id);
        }
        tracing::info!("Starting flow graph '{}' ({} nodes)", runner.graph.id, runner.nodes.len());

        // Record 0 is the start node by convention
        let start = runner
            .graph
            .start_node()
            .and_then(|record| runner.lookup.get(&record.id).copied());

        match start {
            Some(idx) => runner.enter(idx),
            None => runner.finish(),
        }

        runner
    }

    fn build_nodes(&mut self) {
        let graph = Arc::clone(&self.graph);

        for record in &graph.nodes {
            if record.id.is_empty() {
                tracing::debug!("Skipping node record without id in '{}'", graph.id);
                continue;
            }

            if record.node_type() == NodeType::Sequence && record.next().is_some() {
                tracing::warn!(
                    "Sequence node '{}' has next_id '{}' set; sequences ignore it",
                    record.id,
                    record.next().unwrap_or_default()
                );
            }

            let idx = NodeIndex(self.nodes.len());
            self.nodes.push(FlowNode::from_record(record));

            // Later duplicates shadow earlier ones
            if self.lookup.insert(record.id.clone(), idx).is_some() {
                tracing::debug!("Duplicate node id '{}' in '{}'", record.id, graph.id);
            }
        }
    }

    /// Advance the run by one step of `dt` seconds
    ///
    /// At most one node transition happens per call, however many
    /// zero-duration nodes are chained.
    pub fn tick(&mut self, dt: f32) {
        let Some(idx) = self.current else {
            return;
        };
        self.ticks += 1;

        let done = {
            let node = &mut self.nodes[idx.0];
            let mut cx = NodeCx {
                this: idx,
                world: self.world.as_ref(),
                triggers: &mut self.triggers,
                returns: &mut self.returns,
                events: self.events.as_ref(),
            };
            node.tick(dt, &mut cx)
        };

        if !done {
            return;
        }

        self.exit(idx);

        let next = self.nodes[idx.0].successor_id().map(str::to_string);

        match next {
            None => {
                // End of a sub-chain: resume whoever delegated to it
                let len = self.nodes.len();
                match self.returns.pop_valid(|n| n.0 < len) {
                    Some(resume) => {
                        tracing::debug!("Returning to '{}'", self.nodes[resume.0].id());
                        self.enter(resume);
                    }
                    None => self.finish(),
                }
            }
            Some(next_id) => match self.lookup.get(&next_id).copied() {
                Some(next) => self.enter(next),
                None => {
                    tracing::debug!(
                        "Successor '{}' of '{}' not found, ending run",
                        next_id,
                        self.nodes[idx.0].id()
                    );
                    self.finish();
                }
            },
        }
    }

    fn enter(&mut self, idx: NodeIndex) {
        self.current = Some(idx);
        self.enters += 1;

        let node = &mut self.nodes[idx.0];
        let mut cx = NodeCx {
            this: idx,
            world: self.world.as_ref(),
            triggers: &mut self.triggers,
            returns: &mut self.returns,
            events: self.events.as_ref(),
        };
        node.enter(&mut cx);

        tracing::debug!("Entered {} '{}'", node.node_type(), node.id());
        if let Some(events) = &self.events {
            events.node_entered(node.id(), node.node_type(), self.ticks);
        }
    }

    fn exit(&mut self, idx: NodeIndex) {
        let node = &mut self.nodes[idx.0];
        let mut cx = NodeCx {
            this: idx,
            world: self.world.as_ref(),
            triggers: &mut self.triggers,
            returns: &mut self.returns,
            events: self.events.as_ref(),
        };
        node.exit(&mut cx);

        if let Some(events) = &self.events {
            events.node_exited(node.id(), node.node_type(), self.ticks);
        }
    }

    fn finish(&mut self) {
        self.current = None;
        tracing::info!("Flow graph '{}' finished after {} ticks", self.graph.id, self.ticks);
        if let Some(events) = &self.events {
            events.run_finished(&self.graph.id, self.ticks);
        }
    }

    /// Wake every node of this run waiting on `trigger_id`
    ///
    /// Returns how many nodes were woken. Signals are not buffered: with no
    /// waiter this does nothing. Nested runs are not reached.
    pub fn signal_trigger(&mut self, trigger_id: &str) -> usize {
        let waiters = self.triggers.waiting(trigger_id).to_vec();
        let mut woken = 0;

        for idx in waiters {
            if let Some(node) = self.nodes.get_mut(idx.0) {
                if node.signal() {
                    woken += 1;
                }
            }
        }

        tracing::debug!("Trigger '{}' woke {} node(s)", trigger_id, woken);
        if let Some(events) = &self.events {
            events.trigger_signalled(trigger_id, woken);
        }
        woken
    }

    /// Give up on the run, reporting it as stopped
    pub fn abandon(self) {
        tracing::info!("Stopping flow graph '{}'", self.graph.id);
        if let Some(events) = &self.events {
            events.run_stopped(&self.graph.id);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.current.is_none()
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn graph(&self) -> &Arc<GraphDefinition> {
        &self.graph
    }

    pub fn world(&self) -> Option<&Arc<dyn World>> {
        self.world.as_ref()
    }

    pub fn current_node(&self) -> Option<&FlowNode> {
        self.current.map(|idx| &self.nodes[idx.0])
    }

    pub fn current_node_id(&self) -> Option<&str> {
        self.current_node().map(FlowNode::id)
    }

    pub fn current_node_type(&self) -> Option<NodeType> {
        self.current_node().map(FlowNode::node_type)
    }

    pub fn current_status(&self) -> Option<String> {
        self.current_node().map(|n| n.status(self.world.as_ref()))
    }

    /// Instance bound to `id` (the last record with that id)
    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.lookup.get(id).map(|idx| &self.nodes[idx.0])
    }

    pub fn nodes(&self) -> &[FlowNode] {
        &self.nodes
    }

    /// Nested runner of the current node, if it is an active SubFlow
    pub fn nested_runner(&self) -> Option<&GraphRunner> {
        self.current_node().and_then(FlowNode::nested_runner)
    }

    /// Status line for every node instance, in record order
    pub fn node_statuses(&self) -> Vec<NodeStatus> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| NodeStatus {
                node_id: node.id().to_string(),
                node_type: node.node_type(),
                active: self.current == Some(NodeIndex(i)),
                status: node.status(self.world.as_ref()),
            })
            .collect()
    }

    /// Ticks that reached a node (ticks after the run finished don't count)
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Total `enter()` calls made so far, start node included
    pub fn enter_count(&self) -> u64 {
        self.enters
    }

    pub fn return_depth(&self) -> usize {
        self.returns.len()
    }

    pub fn triggers(&self) -> &TriggerRegistry {
        &self.triggers
    }
}

impl fmt::Debug for GraphRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphRunner")
            .field("run_id", &self.run_id)
            .field("graph", &self.graph.id)
            .field("current", &self.current_node_id())
            .field("ticks", &self.ticks)
            .field("return_depth", &self.returns.len())
            .finish()
    }
}

/// Debug view of one node instance
#[derive(Debug, Clone, Serialize)]
pub struct NodeStatus {
    pub node_id: String,
    pub node_type: NodeType,
    pub active: bool,
    pub status: String,
}
