use draftwise_graph::{Append, Overwrite, Reducer, StateSchema};
use serde::{Deserialize, Serialize};

use crate::WriterError;

/// The record threaded through every step of one essay run.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct EssayState {
    pub task: String,
    pub plan: String,
    /// Latest draft only.
    pub draft: String,
    /// Latest critique only.
    pub critique: String,
    /// Research snippets, appended in query order then result order.
    pub content: Vec<String>,
    /// Starts at 1; `generate` adds one per draft.
    pub revision_number: u32,
    pub max_revisions: u32,
}

impl EssayState {
    pub fn new(task: impl Into<String>, max_revisions: u32) -> Result<Self, WriterError> {
        let state = Self {
            task: task.into(),
            revision_number: 1,
            max_revisions,
            ..Default::default()
        };
        state.validate()?;
        Ok(state)
    }

    pub fn validate(&self) -> Result<(), WriterError> {
        if self.task.trim().is_empty() {
            return Err(WriterError::InvalidConfig("task must not be empty".to_string()));
        }
        if self.max_revisions < 1 {
            return Err(WriterError::InvalidConfig(format!(
                "max_revisions must be at least 1, got {}",
                self.max_revisions
            )));
        }
        if self.revision_number < 1 {
            return Err(WriterError::InvalidConfig(format!(
                "revision_number must be at least 1, got {}",
                self.revision_number
            )));
        }
        Ok(())
    }

    /// Number of steps a fresh run takes: plan and research, then
    /// `generate, reflect, research_critique` per revision, minus the
    /// critique pair after the final draft.
    pub fn expected_steps(&self) -> usize {
        3 * self.max_revisions as usize
    }
}

/// Partial update returned by a step. `None` fields are left untouched;
/// `content` holds only the entries to append.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct EssayUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critique: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_number: Option<u32>,
}

fn overwrite<T>(current: &T, update: Option<T>) -> T
where
    T: Clone,
{
    match update {
        Some(value) => Overwrite.reduce(current.clone(), value),
        None => current.clone(),
    }
}

impl StateSchema for EssayState {
    type Update = EssayUpdate;

    fn apply(current: &Self, update: EssayUpdate) -> Self {
        EssayState {
            task: current.task.clone(),
            plan: overwrite(&current.plan, update.plan),
            draft: overwrite(&current.draft, update.draft),
            critique: overwrite(&current.critique, update.critique),
            content: Append.reduce(current.content.clone(), update.content),
            revision_number: overwrite(&current.revision_number, update.revision_number),
            max_revisions: current.max_revisions,
        }
    }
}
