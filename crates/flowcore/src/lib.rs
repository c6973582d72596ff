//! Core abstractions for the flow graph interpreter
//! 
//! This crate provides the graph definition data model, the `World`
//! capability trait a run calls into, and the run event types. It has no
//! scheduling logic of its own.

mod error;
pub mod events;
mod graph;
mod world;

pub use error::{FlowError, GraphError};
pub use graph::{
    ActorSlot, GraphDefinition, NodeKind, NodeRecord, NodeType, ObjectiveAction,
    SequenceRef, non_empty,
};
pub use world::World;
pub use events::*;

/// Result type for flow operations
pub type Result<T> = std::result::Result<T, FlowError>;
