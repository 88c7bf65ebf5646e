use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use draftwise_core::DraftwiseError;
use serde::{Deserialize, Serialize};

use crate::{GraphState, StateSchema};

/// State saved after a step, plus where the run goes next.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(bound = "S: StateSchema")]
pub struct Checkpoint<S: StateSchema> {
    pub thread_id: String,
    pub state: GraphState<S>,
    pub step: u64,
    /// Node that produced this state.
    pub node: String,
    /// Node to run when resuming; `END` once the run finished.
    pub next: String,
    pub created_at: String,
}

impl<S: StateSchema> Checkpoint<S> {
    pub fn new(
        thread_id: String,
        state: GraphState<S>,
        step: u64,
        node: String,
        next: String,
    ) -> Self {
        Self {
            thread_id,
            state,
            step,
            node,
            next,
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

#[async_trait::async_trait]
pub trait Checkpointer<S: StateSchema>: Send + Sync {
    async fn save(&self, checkpoint: &Checkpoint<S>) -> Result<(), DraftwiseError>;
    async fn load(&self, thread_id: &str) -> Result<Option<Checkpoint<S>>, DraftwiseError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointMetadata {
    pub seq: u64,
    pub node: String,
    pub created_at: String,
}

#[async_trait::async_trait]
pub trait HistoryCheckpointer<S: StateSchema>: Send + Sync {
    async fn list_checkpoints(
        &self,
        thread_id: &str,
    ) -> Result<Vec<CheckpointMetadata>, DraftwiseError>;
}

/// Keeps every checkpoint of every thread in memory.
#[derive(Clone)]
pub struct InMemoryCheckpointer<S: StateSchema> {
    inner: Arc<RwLock<HashMap<String, Vec<Checkpoint<S>>>>>,
}

impl<S: StateSchema> Default for InMemoryCheckpointer<S> {
    fn default() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait::async_trait]
impl<S: StateSchema> Checkpointer<S> for InMemoryCheckpointer<S> {
    async fn save(&self, checkpoint: &Checkpoint<S>) -> Result<(), DraftwiseError> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| DraftwiseError::CheckpointFailed("lock".into()))?;
        guard
            .entry(checkpoint.thread_id.clone())
            .or_default()
            .push(checkpoint.clone());
        Ok(())
    }

    async fn load(&self, thread_id: &str) -> Result<Option<Checkpoint<S>>, DraftwiseError> {
        let guard = self
            .inner
            .read()
            .map_err(|_| DraftwiseError::CheckpointFailed("lock".into()))?;
        Ok(guard
            .get(thread_id)
            .and_then(|history| history.last().cloned()))
    }
}

#[async_trait::async_trait]
impl<S: StateSchema> HistoryCheckpointer<S> for InMemoryCheckpointer<S> {
    async fn list_checkpoints(
        &self,
        thread_id: &str,
    ) -> Result<Vec<CheckpointMetadata>, DraftwiseError> {
        let guard = self
            .inner
            .read()
            .map_err(|_| DraftwiseError::CheckpointFailed("lock".into()))?;
        let metadata = guard
            .get(thread_id)
            .map(|history| {
                history
                    .iter()
                    .map(|cp| CheckpointMetadata {
                        seq: cp.step,
                        node: cp.node.clone(),
                        created_at: cp.created_at.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(metadata)
    }
}
