use draftwise_core::DraftwiseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("checkpoint failed: {0}")]
    Checkpoint(String),
    #[error("node '{node}' failed: {source}")]
    NodeFailed {
        node: String,
        source: DraftwiseError,
    },
    #[error("missing node: {node}")]
    MissingNode { node: String },
    #[error("invalid edge from '{from}' to '{to}'")]
    InvalidEdge { from: String, to: String },
    #[error("graph has no entry node")]
    MissingEntry,
    #[error("node '{node}' has no outgoing edge")]
    UnroutedNode { node: String },
    #[error("no target for route {route} from '{node}'")]
    InvalidRoute { node: String, route: String },
    #[error("Max steps exceeded: reached {reached}, limit {max}")]
    MaxStepsExceeded { max: usize, reached: usize },
}

impl GraphError {
    /// The collaborator error behind a failed node, if that is what this is.
    pub fn node_error(&self) -> Option<&DraftwiseError> {
        match self {
            GraphError::NodeFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}
