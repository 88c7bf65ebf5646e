use draftwise_core::DraftwiseError;
use draftwise_graph::GraphError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WriterError {
    /// Rejected before any step ran.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl WriterError {
    /// The collaborator error that aborted the run, if any.
    pub fn capability_error(&self) -> Option<&DraftwiseError> {
        match self {
            WriterError::Graph(err) => err.node_error(),
            WriterError::InvalidConfig(_) => None,
        }
    }

    /// Step that failed, if the run was aborted by a step.
    pub fn failed_node(&self) -> Option<&str> {
        match self {
            WriterError::Graph(GraphError::NodeFailed { node, .. }) => Some(node),
            _ => None,
        }
    }
}
