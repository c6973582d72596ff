use flowcore::{SequenceRef, World};

/// World where nothing plays and no condition holds
#[derive(Debug, Clone, Copy, Default)]
pub struct NullWorld;

impl World for NullWorld {
    fn play_dialogue(&self, _sequence: &SequenceRef) {}
    
    fn is_dialogue_playing(&self, _sequence: &SequenceRef) -> bool {
        false
    }
    
    fn activate_objective(&self, _objective_id: &str) {}
    
    fn complete_objective(&self, _objective_id: &str) {}
    
    fn is_condition_true(&self, _condition_id: &str) -> bool {
        false
    }
}
