//! A small state-machine engine: named nodes, direct and conditional edges,
//! and a single shared state threaded through every step.
//!
//! Nodes return partial updates which the state schema merges into the
//! current state. Runs either complete in one call or are streamed as one
//! [`GraphSnapshot`] per executed step.

mod checkpoint;
mod config;
mod error;
mod file_checkpointer;
mod graph;
mod program;
mod snapshot;
pub mod state;

pub use checkpoint::{
    Checkpoint, CheckpointMetadata, Checkpointer, HistoryCheckpointer, InMemoryCheckpointer,
};
pub use config::{ExecutionConfig, ExecutionOptions};
pub use error::GraphError;
pub use file_checkpointer::{CheckpointRecord, FileCheckpointer};
pub use graph::{ExecutableGraph, GraphBuilder, END};
pub use program::{EdgeKind, GraphProgram};
pub use snapshot::GraphSnapshot;
pub use state::{Append, GraphState, Overwrite, Reducer, StateSchema, StateUpdate};
