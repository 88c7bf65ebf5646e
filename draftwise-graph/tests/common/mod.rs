#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use draftwise_core::{DraftwiseError, Runnable};
use draftwise_graph::{Append, GraphState, Reducer, StateSchema, StateUpdate};
use serde::{Deserialize, Serialize};

#[derive(Clone, Default, Debug, Serialize, Deserialize, PartialEq)]
pub struct DemoState {
    pub count: i32,
    pub log: Vec<String>,
}

#[derive(Clone, Default, Debug, Serialize, Deserialize)]
pub struct DemoUpdate {
    pub count: Option<i32>,
    pub log: Vec<String>,
}

impl StateSchema for DemoState {
    type Update = DemoUpdate;

    fn apply(current: &Self, update: DemoUpdate) -> Self {
        DemoState {
            count: update.count.unwrap_or(current.count),
            log: Append.reduce(current.log.clone(), update.log),
        }
    }
}

pub fn state(count: i32) -> GraphState<DemoState> {
    GraphState::new(DemoState {
        count,
        log: vec![],
    })
}

/// Increments `count` and logs its own name.
pub struct Inc {
    pub name: &'static str,
    pub calls: Arc<AtomicUsize>,
}

impl Inc {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn counted(name: &'static str, calls: Arc<AtomicUsize>) -> Self {
        Self { name, calls }
    }
}

#[async_trait::async_trait]
impl Runnable<GraphState<DemoState>, StateUpdate<DemoState>> for Inc {
    async fn invoke(
        &self,
        input: GraphState<DemoState>,
    ) -> Result<StateUpdate<DemoState>, DraftwiseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(StateUpdate::new(DemoUpdate {
            count: Some(input.data.count + 1),
            log: vec![self.name.to_string()],
        }))
    }
}

/// Logs its name without touching `count`.
pub struct Note(pub &'static str);

#[async_trait::async_trait]
impl Runnable<GraphState<DemoState>, StateUpdate<DemoState>> for Note {
    async fn invoke(
        &self,
        _input: GraphState<DemoState>,
    ) -> Result<StateUpdate<DemoState>, DraftwiseError> {
        Ok(StateUpdate::new(DemoUpdate {
            count: None,
            log: vec![self.0.to_string()],
        }))
    }
}

pub struct Fail;

#[async_trait::async_trait]
impl Runnable<GraphState<DemoState>, StateUpdate<DemoState>> for Fail {
    async fn invoke(
        &self,
        _input: GraphState<DemoState>,
    ) -> Result<StateUpdate<DemoState>, DraftwiseError> {
        Err(DraftwiseError::LlmProvider("boom".to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Again,
    Stop,
}

/// Loops while `count` is below `limit`.
pub fn below(limit: i32) -> impl Fn(&GraphState<DemoState>) -> Route + Send + Sync + 'static {
    move |state: &GraphState<DemoState>| {
        if state.data.count < limit {
            Route::Again
        } else {
            Route::Stop
        }
    }
}
