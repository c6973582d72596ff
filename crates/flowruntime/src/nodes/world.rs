use super::NodeCx;
use flowcore::{ObjectiveAction, SequenceRef, World};
use std::sync::Arc;

/// Plays a dialogue sequence through the world
#[derive(Debug, Clone)]
pub struct DialogueNode {
    sequence: Option<SequenceRef>,
    wait_for_completion: bool,
    started: bool,
}

impl DialogueNode {
    pub fn new(sequence: Option<SequenceRef>, wait_for_completion: bool) -> Self {
        Self {
            sequence,
            wait_for_completion,
            started: false,
        }
    }
    
    pub fn started(&self) -> bool {
        self.started
    }
    
    pub(crate) fn enter(&mut self) {
        self.started = false;
    }
    
    pub(crate) fn tick(&mut self, cx: &mut NodeCx<'_>) -> bool {
        // No dialogue or no world: nothing to play
        let (Some(sequence), Some(world)) = (self.sequence.as_ref(), cx.world) else {
            return true;
        };
        
        if !self.started {
            self.started = true;
            tracing::debug!("Playing dialogue '{}'", sequence);
            world.play_dialogue(sequence);
        }
        
        if !self.wait_for_completion {
            return true;
        }
        
        !world.is_dialogue_playing(sequence)
    }
    
    pub(crate) fn status(&self, world: Option<&Arc<dyn World>>) -> String {
        let name = self.sequence.as_ref().map(SequenceRef::as_str).unwrap_or("(none)");
        let mode = if self.wait_for_completion {
            "wait-for-complete"
        } else {
            "fire-and-forget"
        };
        
        let playing = match (self.sequence.as_ref(), world) {
            (Some(sequence), Some(world)) => world.is_dialogue_playing(sequence),
            _ => false,
        };
        
        let state = if !self.started {
            "pending start"
        } else if playing {
            "playing"
        } else {
            "finished"
        };
        
        format!("{} [{}, {}]", name, mode, state)
    }
}

/// Fire-and-forget objective change
#[derive(Debug, Clone)]
pub struct ObjectiveNode {
    objective_id: String,
    action: ObjectiveAction,
}

impl ObjectiveNode {
    pub fn new(objective_id: String, action: ObjectiveAction) -> Self {
        Self {
            objective_id,
            action,
        }
    }
    
    pub(crate) fn tick(&self, cx: &mut NodeCx<'_>) -> bool {
        if let Some(world) = cx.world {
            if !self.objective_id.is_empty() {
                match self.action {
                    ObjectiveAction::Activate => world.activate_objective(&self.objective_id),
                    ObjectiveAction::Complete => world.complete_objective(&self.objective_id),
                }
            }
        }
        
        // Waiting for an objective is done by chaining a WaitForTrigger
        true
    }
    
    pub(crate) fn status(&self) -> String {
        format!("{:?} '{}'", self.action, self.objective_id)
    }
}
