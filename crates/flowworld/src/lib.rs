//! Standard world library
//! 
//! Ready-made `World` implementations for hosts, tools and tests

mod null;
mod script;
mod scripted;

pub use null::NullWorld;
pub use script::{ScheduledTrigger, WorldScript};
pub use scripted::{ObjectiveState, ScriptedWorld, WorldCall};
