use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use draftwise_core::DraftwiseError;
use serde::{Deserialize, Serialize};

use crate::{Checkpoint, CheckpointMetadata, Checkpointer, HistoryCheckpointer, StateSchema};

/// One line of a thread's JSONL file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "S: StateSchema")]
pub struct CheckpointRecord<S: StateSchema> {
    pub seq: u64,
    pub checkpoint: Checkpoint<S>,
}

/// Appends checkpoints to `<base_dir>/<encoded thread_id>.jsonl`.
#[derive(Clone, Debug)]
pub struct FileCheckpointer {
    base_dir: PathBuf,
}

fn io_err(err: impl std::fmt::Display) -> DraftwiseError {
    DraftwiseError::CheckpointFailed(err.to_string())
}

impl FileCheckpointer {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// Maps a thread id to a file stem, one-to-one. ASCII letters, digits,
    /// `-` and `_` are kept; every other byte is written as `%XX`.
    fn encode_thread_id(thread_id: &str) -> String {
        if thread_id.is_empty() {
            return "%".to_string();
        }
        let mut out = String::with_capacity(thread_id.len());
        for byte in thread_id.bytes() {
            match byte {
                b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' => out.push(byte as char),
                other => out.push_str(&format!("%{other:02X}")),
            }
        }
        out
    }

    fn thread_path(&self, thread_id: &str) -> PathBuf {
        let filename = format!("{}.jsonl", Self::encode_thread_id(thread_id));
        self.base_dir.join(filename)
    }

    fn read_records<S: StateSchema>(
        &self,
        thread_id: &str,
    ) -> Result<Vec<CheckpointRecord<S>>, DraftwiseError> {
        let path = self.thread_path(thread_id);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let reader = BufReader::new(File::open(&path).map_err(io_err)?);
        let mut records = Vec::new();
        for line in reader.lines() {
            let line = line.map_err(io_err)?;
            if line.trim().is_empty() {
                continue;
            }
            let record: CheckpointRecord<S> = serde_json::from_str(&line).map_err(io_err)?;
            if record.checkpoint.thread_id == thread_id {
                records.push(record);
            }
        }
        Ok(records)
    }
}

#[async_trait::async_trait]
impl<S: StateSchema> Checkpointer<S> for FileCheckpointer {
    async fn save(&self, checkpoint: &Checkpoint<S>) -> Result<(), DraftwiseError> {
        fs::create_dir_all(&self.base_dir).map_err(io_err)?;

        let seq = self
            .read_records::<S>(&checkpoint.thread_id)?
            .last()
            .map(|record| record.seq + 1)
            .unwrap_or(1);
        let record = CheckpointRecord {
            seq,
            checkpoint: checkpoint.clone(),
        };
        let line = serde_json::to_string(&record).map_err(io_err)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.thread_path(&checkpoint.thread_id))
            .map_err(io_err)?;
        file.write_all(format!("{line}\n").as_bytes())
            .map_err(io_err)?;
        Ok(())
    }

    async fn load(&self, thread_id: &str) -> Result<Option<Checkpoint<S>>, DraftwiseError> {
        Ok(self
            .read_records::<S>(thread_id)?
            .pop()
            .map(|record| record.checkpoint))
    }
}

#[async_trait::async_trait]
impl<S: StateSchema> HistoryCheckpointer<S> for FileCheckpointer {
    async fn list_checkpoints(
        &self,
        thread_id: &str,
    ) -> Result<Vec<CheckpointMetadata>, DraftwiseError> {
        Ok(self
            .read_records::<S>(thread_id)?
            .into_iter()
            .map(|record| CheckpointMetadata {
                seq: record.seq,
                node: record.checkpoint.node,
                created_at: record.checkpoint.created_at,
            })
            .collect())
    }
}
