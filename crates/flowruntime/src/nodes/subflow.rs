use super::NodeCx;
use crate::GraphRunner;
use flowcore::GraphDefinition;
use std::sync::Arc;
use uuid::Uuid;

/// Runs a nested graph to completion on its own runner
///
/// The nested runner shares the parent's world but owns its own trigger
/// registry and return stack. It lives only while this node has control.
#[derive(Debug)]
pub struct SubFlowNode {
    graph: Option<Arc<GraphDefinition>>,
    runner: Option<Box<GraphRunner>>,
}

impl SubFlowNode {
    pub fn new(graph: Option<Arc<GraphDefinition>>) -> Self {
        Self {
            graph,
            runner: None,
        }
    }
    
    pub fn runner(&self) -> Option<&GraphRunner> {
        self.runner.as_deref()
    }
    
    pub(crate) fn enter(&mut self, cx: &mut NodeCx<'_>) {
        self.runner = self.graph.as_ref().map(|graph| {
            let events = cx.events.map(|e| e.nested(Uuid::new_v4()));
            Box::new(GraphRunner::with_events(
                Arc::clone(graph),
                cx.world.cloned(),
                events,
            ))
        });
    }
    
    pub(crate) fn tick(&mut self, dt: f32) -> bool {
        let Some(runner) = self.runner.as_mut() else {
            return true;
        };
        
        if runner.is_finished() {
            return true;
        }
        
        runner.tick(dt);
        runner.is_finished()
    }
    
    pub(crate) fn exit(&mut self) {
        self.runner = None;
    }
    
    pub(crate) fn status(&self) -> String {
        let graph_id = self.graph.as_ref().map(|g| g.id.as_str()).unwrap_or("(none)");
        match self.runner.as_deref() {
            Some(runner) if runner.is_finished() => format!("{} [finished]", graph_id),
            Some(runner) => format!(
                "{} [at {}]",
                graph_id,
                runner
                    .current_status()
                    .unwrap_or_else(|| "(idle)".to_string())
            ),
            None => format!("{} [not running]", graph_id),
        }
    }
}
