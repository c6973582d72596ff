use crate::SequenceRef;

/// Capabilities a flow run calls into.
///
/// Implemented by the host game. All methods are synchronous and take
/// `&self`; implementations that track state use interior mutability.
pub trait World: Send + Sync {
    /// Fire a dialogue sequence. Nothing is awaited.
    fn play_dialogue(&self, sequence: &SequenceRef);
    
    /// Whether the given sequence is still being presented.
    fn is_dialogue_playing(&self, sequence: &SequenceRef) -> bool;
    
    fn activate_objective(&self, objective_id: &str);
    
    fn complete_objective(&self, objective_id: &str);
    
    /// Pure query used by Branch nodes.
    fn is_condition_true(&self, condition_id: &str) -> bool;
}
