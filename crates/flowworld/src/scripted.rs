use crate::WorldScript;
use flowcore::{SequenceRef, World};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

/// A command a flow run issued to the world
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "call")]
pub enum WorldCall {
    PlayDialogue { sequence: SequenceRef },
    ActivateObjective { objective_id: String },
    CompleteObjective { objective_id: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ObjectiveState {
    #[default]
    Inactive,
    Active,
    Completed,
}

#[derive(Debug, Default)]
struct WorldState {
    conditions: HashSet<String>,
    playing: HashMap<SequenceRef, f32>,
    objectives: HashMap<String, ObjectiveState>,
    journal: Vec<WorldCall>,
}

/// Self-contained world driven by a [`WorldScript`]
///
/// Dialogue plays for a scripted duration that the host burns down with
/// [`ScriptedWorld::advance`]; conditions can be flipped at any time; every
/// command is kept in a journal.
#[derive(Debug, Default)]
pub struct ScriptedWorld {
    script: WorldScript,
    state: Mutex<WorldState>,
}

impl ScriptedWorld {
    pub fn new(script: WorldScript) -> Self {
        let state = WorldState {
            conditions: script.conditions.iter().cloned().collect(),
            ..WorldState::default()
        };

        Self {
            script,
            state: Mutex::new(state),
        }
    }

    pub fn script(&self) -> &WorldScript {
        &self.script
    }

    fn state(&self) -> MutexGuard<'_, WorldState> {
        // A panic while holding the lock leaves plain data behind; keep going
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Let `dt` seconds of presentation time pass
    pub fn advance(&self, dt: f32) {
        let mut state = self.state();
        for remaining in state.playing.values_mut() {
            *remaining -= dt;
        }
        state.playing.retain(|sequence, remaining| {
            let keep = *remaining > 0.0;
            if !keep {
                tracing::debug!("Dialogue '{}' finished", sequence);
            }
            keep
        });
    }

    /// End a dialogue now, as if the player skipped it
    pub fn finish_dialogue(&self, sequence: &SequenceRef) {
        self.state().playing.remove(sequence);
    }

    pub fn set_condition(&self, condition_id: impl Into<String>, value: bool) {
        let condition_id = condition_id.into();
        let mut state = self.state();
        if value {
            state.conditions.insert(condition_id);
        } else {
            state.conditions.remove(&condition_id);
        }
    }

    pub fn objective_state(&self, objective_id: &str) -> ObjectiveState {
        self.state()
            .objectives
            .get(objective_id)
            .copied()
            .unwrap_or_default()
    }

    /// Sequences currently presenting, sorted for stable output
    pub fn playing(&self) -> Vec<SequenceRef> {
        let mut playing: Vec<_> = self.state().playing.keys().cloned().collect();
        playing.sort();
        playing
    }

    pub fn journal(&self) -> Vec<WorldCall> {
        self.state().journal.clone()
    }

    /// Drain the journal, leaving it empty
    pub fn take_journal(&self) -> Vec<WorldCall> {
        std::mem::take(&mut self.state().journal)
    }
}

impl World for ScriptedWorld {
    fn play_dialogue(&self, sequence: &SequenceRef) {
        let duration = self.script.dialogue_duration(sequence.as_str());
        let mut state = self.state();
        state.journal.push(WorldCall::PlayDialogue {
            sequence: sequence.clone(),
        });
        if duration > 0.0 {
            state.playing.insert(sequence.clone(), duration);
        }
    }

    fn is_dialogue_playing(&self, sequence: &SequenceRef) -> bool {
        self.state().playing.contains_key(sequence)
    }

    fn activate_objective(&self, objective_id: &str) {
        let mut state = self.state();
        state.journal.push(WorldCall::ActivateObjective {
            objective_id: objective_id.to_string(),
        });
        state
            .objectives
            .insert(objective_id.to_string(), ObjectiveState::Active);
    }

    fn complete_objective(&self, objective_id: &str) {
        let mut state = self.state();
        state.journal.push(WorldCall::CompleteObjective {
            objective_id: objective_id.to_string(),
        });
        state
            .objectives
            .insert(objective_id.to_string(), ObjectiveState::Completed);
    }

    fn is_condition_true(&self, condition_id: &str) -> bool {
        self.state().conditions.contains(condition_id)
    }
}
