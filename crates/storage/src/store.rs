// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory task index with per-task write serialization.

use parking_lot::{Mutex, RwLock};
use pbl_core::{Task, TaskId};
use std::collections::HashMap;
use std::sync::Arc;

/// The single source of truth for live tasks.
///
/// Reads hand out consistent clones. Writers must serialize per task_id by
/// holding the task's [`write_lock`](Self::write_lock) for the whole
/// read–reduce–save cycle; tasks never contend with each other.
#[derive(Default)]
pub struct TaskStore {
    tasks: RwLock<HashMap<TaskId, Task>>,
    locks: Mutex<HashMap<TaskId, Arc<tokio::sync::Mutex<()>>>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consistent snapshot of a task.
    pub fn get(&self, task_id: &str) -> Option<Task> {
        self.tasks.read().get(task_id).cloned()
    }

    pub fn contains(&self, task_id: &str) -> bool {
        self.tasks.read().contains_key(task_id)
    }

    pub fn save(&self, task: Task) {
        self.tasks.write().insert(task.task_id, task);
    }

    pub fn list(&self) -> Vec<Task> {
        self.tasks.read().values().cloned().collect()
    }

    pub fn remove(&self, task_id: &str) -> Option<Task> {
        self.locks.lock().remove(task_id);
        self.tasks.write().remove(task_id)
    }

    /// The per-task mutation lock. Hold its guard across the whole
    /// read–reduce–save cycle of one logical request.
    pub fn write_lock(&self, task_id: TaskId) -> Arc<tokio::sync::Mutex<()>> {
        self.locks
            .lock()
            .entry(task_id)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
