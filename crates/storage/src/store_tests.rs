// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn save_and_get_roundtrip() {
    let store = TaskStore::new();
    let task = Task::builder().build();
    let id = task.task_id;
    store.save(task.clone());
    assert_eq!(store.get(&id), Some(task));
    assert!(store.contains(&id));
}

#[test]
fn get_returns_consistent_clone() {
    let store = TaskStore::new();
    let task = Task::builder().build();
    let id = task.task_id;
    store.save(task);
    let mut copy = store.get(&id).unwrap();
    copy.working_memory.focus = "mutated".into();
    // The stored task is unaffected by mutating the clone.
    assert_eq!(store.get(&id).unwrap().working_memory.focus, "");
}

#[test]
fn missing_task_is_none() {
    let store = TaskStore::new();
    assert!(store.get("tsk-missing").is_none());
    assert!(!store.contains("tsk-missing"));
}

#[test]
fn list_returns_all_tasks() {
    let store = TaskStore::new();
    store.save(Task::builder().build());
    store.save(Task::builder().build());
    assert_eq!(store.list().len(), 2);
}

#[test]
fn remove_drops_task_and_lock() {
    let store = TaskStore::new();
    let task = Task::builder().build();
    let id = task.task_id;
    store.save(task);
    let _lock = store.write_lock(id);
    assert!(store.remove(&id).is_some());
    assert!(store.get(&id).is_none());
}

#[tokio::test]
async fn write_lock_serializes_same_task() {
    let store = TaskStore::new();
    let task = Task::builder().build();
    let id = task.task_id;
    store.save(task);

    let lock = store.write_lock(id);
    let guard = lock.lock().await;
    // A second handle to the same task shares the mutex.
    let other = store.write_lock(id);
    assert!(other.try_lock().is_err());
    drop(guard);
    assert!(other.try_lock().is_ok());
}

#[tokio::test]
async fn write_locks_are_independent_across_tasks() {
    let store = TaskStore::new();
    let a = Task::builder().build();
    let b = Task::builder().build();
    let lock_a = store.write_lock(a.task_id);
    let lock_b = store.write_lock(b.task_id);
    let _guard_a = lock_a.lock().await;
    assert!(lock_b.try_lock().is_ok());
}
