use crate::NodeType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

pub type RunId = Uuid;

/// Events emitted while a graph run advances
///
/// `depth` is 0 for a top-level run and grows by one for every SubFlow
/// level the emitting runner is nested under.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RunEvent {
    RunStarted {
        run_id: RunId,
        graph_id: String,
        depth: u32,
        timestamp: DateTime<Utc>,
    },
    NodeEntered {
        run_id: RunId,
        node_id: String,
        node_type: NodeType,
        depth: u32,
        tick: u64,
        timestamp: DateTime<Utc>,
    },
    NodeExited {
        run_id: RunId,
        node_id: String,
        node_type: NodeType,
        depth: u32,
        tick: u64,
        timestamp: DateTime<Utc>,
    },
    TriggerSignalled {
        run_id: RunId,
        trigger_id: String,
        woken: usize,
        depth: u32,
        timestamp: DateTime<Utc>,
    },
    RunFinished {
        run_id: RunId,
        graph_id: String,
        depth: u32,
        ticks: u64,
        timestamp: DateTime<Utc>,
    },
    RunStopped {
        run_id: RunId,
        graph_id: String,
        depth: u32,
        timestamp: DateTime<Utc>,
    },
}

impl RunEvent {
    pub fn run_id(&self) -> RunId {
        match self {
            RunEvent::RunStarted { run_id, .. }
            | RunEvent::NodeEntered { run_id, .. }
            | RunEvent::NodeExited { run_id, .. }
            | RunEvent::TriggerSignalled { run_id, .. }
            | RunEvent::RunFinished { run_id, .. }
            | RunEvent::RunStopped { run_id, .. } => *run_id,
        }
    }

    pub fn depth(&self) -> u32 {
        match self {
            RunEvent::RunStarted { depth, .. }
            | RunEvent::NodeEntered { depth, .. }
            | RunEvent::NodeExited { depth, .. }
            | RunEvent::TriggerSignalled { depth, .. }
            | RunEvent::RunFinished { depth, .. }
            | RunEvent::RunStopped { depth, .. } => *depth,
        }
    }
}

/// Event emitter a runner uses to report progress
///
/// Cheap to clone. Sending never blocks and never fails the run, even
/// with no subscribers.
#[derive(Clone)]
pub struct EventEmitter {
    run_id: RunId,
    depth: u32,
    sender: broadcast::Sender<RunEvent>,
}

impl EventEmitter {
    pub fn new(run_id: RunId, depth: u32, sender: broadcast::Sender<RunEvent>) -> Self {
        Self {
            run_id,
            depth,
            sender,
        }
    }
    
    pub fn run_id(&self) -> RunId {
        self.run_id
    }
    
    pub fn depth(&self) -> u32 {
        self.depth
    }
    
    /// Emitter for a run nested one level below this one
    pub fn nested(&self, run_id: RunId) -> Self {
        Self::new(run_id, self.depth + 1, self.sender.clone())
    }
    
    pub fn emit(&self, event: RunEvent) {
        let _ = self.sender.send(event);
    }
    
    pub fn run_started(&self, graph_id: &str) {
        self.emit(RunEvent::RunStarted {
            run_id: self.run_id,
            graph_id: graph_id.to_string(),
            depth: self.depth,
            timestamp: Utc::now(),
        });
    }
    
    pub fn node_entered(&self, node_id: &str, node_type: NodeType, tick: u64) {
        self.emit(RunEvent::NodeEntered {
            run_id: self.run_id,
            node_id: node_id.to_string(),
            node_type,
            depth: self.depth,
            tick,
            timestamp: Utc::now(),
        });
    }
    
    pub fn node_exited(&self, node_id: &str, node_type: NodeType, tick: u64) {
        self.emit(RunEvent::NodeExited {
            run_id: self.run_id,
            node_id: node_id.to_string(),
            node_type,
            depth: self.depth,
            tick,
            timestamp: Utc::now(),
        });
    }
    
    pub fn trigger_signalled(&self, trigger_id: &str, woken: usize) {
        self.emit(RunEvent::TriggerSignalled {
            run_id: self.run_id,
            trigger_id: trigger_id.to_string(),
            woken,
            depth: self.depth,
            timestamp: Utc::now(),
        });
    }
    
    pub fn run_finished(&self, graph_id: &str, ticks: u64) {
        self.emit(RunEvent::RunFinished {
            run_id: self.run_id,
            graph_id: graph_id.to_string(),
            depth: self.depth,
            ticks,
            timestamp: Utc::now(),
        });
    }
    
    pub fn run_stopped(&self, graph_id: &str) {
        self.emit(RunEvent::RunStopped {
            run_id: self.run_id,
            graph_id: graph_id.to_string(),
            depth: self.depth,
            timestamp: Utc::now(),
        });
    }
}

/// Broadcast bus for run events
pub struct EventBus {
    sender: broadcast::Sender<RunEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }
    
    pub fn subscribe(&self) -> broadcast::Receiver<RunEvent> {
        self.sender.subscribe()
    }
    
    pub fn emit(&self, event: RunEvent) {
        let _ = self.sender.send(event);
    }
    
    /// Emitter for a fresh top-level run
    pub fn create_emitter(&self, run_id: RunId) -> EventEmitter {
        EventEmitter::new(run_id, 0, self.sender.clone())
    }
}
