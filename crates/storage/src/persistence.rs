// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON persistence: one snapshot file per task plus an append-only
//! event log.
//!
//! Layout under the base directory:
//! - `tasks/<task_id>.json`: most recent task snapshot (overwritten)
//! - `events/<task_id>.jsonl`: one event per line, mutation order
//!
//! The snapshot is a convenience projection; the event log is the
//! authoritative history and replays through the reducer from an empty
//! task shell.

use pbl_core::{replay, Event, Task, TaskId};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Disk persistence for tasks and their event logs.
pub struct JsonPersistence {
    tasks_dir: PathBuf,
    events_dir: PathBuf,
}

impl JsonPersistence {
    /// Open (creating directories as needed) under `base_dir`.
    pub fn open(base_dir: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let base = base_dir.as_ref();
        let tasks_dir = base.join("tasks");
        let events_dir = base.join("events");
        std::fs::create_dir_all(&tasks_dir)?;
        std::fs::create_dir_all(&events_dir)?;
        Ok(Self { tasks_dir, events_dir })
    }

    fn snapshot_path(&self, task_id: &str) -> PathBuf {
        self.tasks_dir.join(format!("{task_id}.json"))
    }

    fn events_path(&self, task_id: &str) -> PathBuf {
        self.events_dir.join(format!("{task_id}.jsonl"))
    }

    /// Overwrite the task snapshot.
    pub fn save_snapshot(&self, task: &Task) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(task)?;
        let mut file = File::create(self.snapshot_path(&task.task_id))?;
        file.write_all(json.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    /// Append one event to the task's log.
    pub fn append_event(&self, event: &Event) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(event)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.events_path(&event.task_id))?;
        file.write_all(json.as_bytes())?;
        file.write_all(b"\n")?;
        file.flush()?;
        Ok(())
    }

    /// Latest snapshot, or `None` when the task was never persisted.
    pub fn load_snapshot(&self, task_id: &str) -> Result<Option<Task>, PersistenceError> {
        let path = self.snapshot_path(task_id);
        if !path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    /// Full ordered event log for a task.
    pub fn load_events(&self, task_id: &str) -> Result<Vec<Event>, PersistenceError> {
        let path = self.events_path(task_id);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let reader = BufReader::new(File::open(path)?);
        let mut events = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            events.push(serde_json::from_str(&line)?);
        }
        Ok(events)
    }

    /// Rebuild a task by replaying its event log from an empty shell.
    pub fn replay_task(&self, task_id: TaskId) -> Result<Option<Task>, PersistenceError> {
        let events = self.load_events(&task_id)?;
        if events.is_empty() {
            return Ok(None);
        }
        Ok(Some(replay(task_id, events.iter())))
    }
}

#[cfg(test)]
#[path = "persistence_tests.rs"]
mod tests;
