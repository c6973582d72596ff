use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
    
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Problems with a graph definition found by tooling. The runner itself
/// never raises these; it degrades to ending the run instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Graph not found: {0}")]
    NotFound(String),
    
    #[error("Invalid graph: {0}")]
    Invalid(String),
}
