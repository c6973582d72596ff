use flowcore::{FlowError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Declarative setup for a [`ScriptedWorld`](crate::ScriptedWorld)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldScript {
    /// Condition ids that start out true
    #[serde(default)]
    pub conditions: Vec<String>,
    
    /// How long each dialogue sequence plays, in seconds
    #[serde(default)]
    pub dialogue_seconds: HashMap<String, f32>,
    
    /// Duration for sequences not listed above. 0 ends them on the spot.
    #[serde(default)]
    pub default_dialogue_seconds: f32,
    
    /// Triggers for the host to signal at given ticks
    #[serde(default)]
    pub triggers: Vec<ScheduledTrigger>,
}

/// A trigger the host should raise once `at_tick` ticks have run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledTrigger {
    pub at_tick: u64,
    pub trigger_id: String,
}

impl WorldScript {
    pub fn new() -> Self {
        Self::default()
    }
    
    pub fn with_condition(mut self, condition_id: impl Into<String>) -> Self {
        self.conditions.push(condition_id.into());
        self
    }
    
    pub fn with_dialogue(mut self, sequence: impl Into<String>, seconds: f32) -> Self {
        self.dialogue_seconds.insert(sequence.into(), seconds);
        self
    }
    
    pub fn with_default_dialogue_seconds(mut self, seconds: f32) -> Self {
        self.default_dialogue_seconds = seconds;
        self
    }
    
    pub fn with_trigger(mut self, at_tick: u64, trigger_id: impl Into<String>) -> Self {
        self.triggers.push(ScheduledTrigger {
            at_tick,
            trigger_id: trigger_id.into(),
        });
        self
    }
    
    /// Trigger ids scheduled for exactly `tick`, in declaration order
    pub fn triggers_at(&self, tick: u64) -> impl Iterator<Item = &str> {
        self.triggers
            .iter()
            .filter(move |t| t.at_tick == tick)
            .map(|t| t.trigger_id.as_str())
    }
    
    /// How long `sequence` plays under this script
    pub fn dialogue_duration(&self, sequence: &str) -> f32 {
        self.dialogue_seconds
            .get(sequence)
            .copied()
            .unwrap_or(self.default_dialogue_seconds)
    }
    
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(FlowError::from)
    }
    
    /// Load a script from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let script = Self::from_json_str(&json)?;
        tracing::debug!(
            "Loaded world script from {}: {} conditions, {} scheduled triggers",
            path.as_ref().display(),
            script.conditions.len(),
            script.triggers.len()
        );
        Ok(script)
    }
}
