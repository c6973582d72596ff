use crate::{validate, GraphRunner, NodeStatus, Severity};
use flowcore::{EventBus, GraphDefinition, NodeType, RunEvent, RunId, World};
use std::sync::Arc;

/// Host-facing controller owning at most one active flow run
///
/// Holds the world every run calls into and the event bus runs report to.
pub struct FlowRuntime {
    world: Option<Arc<dyn World>>,
    config: RuntimeConfig,
    event_bus: Arc<EventBus>,
    runner: Option<GraphRunner>,
}

impl FlowRuntime {
    /// Create a runtime with default settings
    pub fn new(world: Arc<dyn World>) -> Self {
        Self::with_config(Some(world), RuntimeConfig::default())
    }

    /// Create a runtime with custom configuration. Without a world, nodes
    /// that need one complete immediately.
    pub fn with_config(world: Option<Arc<dyn World>>, config: RuntimeConfig) -> Self {
        let event_bus = Arc::new(EventBus::new(config.event_buffer_size));

        Self {
            world,
            config,
            event_bus,
            runner: None,
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Begin a new run, abandoning any previous one
    pub fn start(&mut self, graph: impl Into<Arc<GraphDefinition>>) -> RunId {
        let graph = graph.into();

        if let Some(previous) = self.runner.take() {
            previous.abandon();
        }

        if self.config.validate_on_start {
            let report = validate(&graph);
            for issue in report.issues() {
                match issue.severity {
                    Severity::Error => tracing::warn!("Graph '{}': {}", graph.id, issue),
                    Severity::Warning => tracing::info!("Graph '{}': {}", graph.id, issue),
                }
            }
        }

        let emitter = self.event_bus.create_emitter(RunId::new_v4());
        let runner = GraphRunner::with_events(graph, self.world.clone(), Some(emitter));
        let run_id = runner.run_id();
        self.runner = Some(runner);
        run_id
    }

    /// Advance the active run by one step
    pub fn tick(&mut self, dt: f32) {
        if let Some(runner) = self.runner.as_mut() {
            runner.tick(dt);
        }
    }

    /// Abandon the active run. Side effects already issued are not undone.
    pub fn stop(&mut self) {
        if let Some(runner) = self.runner.take() {
            runner.abandon();
        }
    }

    /// Forward a trigger to the active run; returns the number of nodes woken
    pub fn signal_trigger(&mut self, trigger_id: &str) -> usize {
        match self.runner.as_mut() {
            Some(runner) => runner.signal_trigger(trigger_id),
            None => 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.runner.as_ref().is_some_and(|r| !r.is_finished())
    }

    pub fn runner(&self) -> Option<&GraphRunner> {
        self.runner.as_ref()
    }

    pub fn current_graph(&self) -> Option<&Arc<GraphDefinition>> {
        self.runner.as_ref().map(GraphRunner::graph)
    }

    pub fn current_node_id(&self) -> Option<&str> {
        self.runner.as_ref().and_then(GraphRunner::current_node_id)
    }

    pub fn current_node_type(&self) -> Option<NodeType> {
        self.runner.as_ref().and_then(GraphRunner::current_node_type)
    }

    pub fn node_statuses(&self) -> Vec<NodeStatus> {
        self.runner
            .as_ref()
            .map(GraphRunner::node_statuses)
            .unwrap_or_default()
    }

    /// Subscribe to run events
    pub fn subscribe_events(&self) -> tokio::sync::broadcast::Receiver<RunEvent> {
        self.event_bus.subscribe()
    }

    /// Get the event bus for direct access
    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }
}

/// Configuration for the runtime
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub event_buffer_size: usize,
    /// Lint each graph on start and log what was found
    pub validate_on_start: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: 1000,
            validate_on_start: true,
        }
    }
}
