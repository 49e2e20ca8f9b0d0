// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;
use pbl_core::{
    apply_event, Candidate, EntryPoint, EventPayload, RevisionId, StageStatus, StageType,
    TaskStatus,
};
use serde_json::Map;
use tempfile::tempdir;

fn ts(secs: i64) -> chrono::DateTime<chrono::Utc> {
    chrono::Utc.timestamp_opt(1_760_000_000 + secs, 0).single().unwrap()
}

fn created_event(task_id: TaskId, secs: i64) -> Event {
    Event::new(
        task_id,
        None,
        ts(secs),
        EventPayload::TaskCreated {
            entry_point: EntryPoint::Scenario,
            entry_data: Map::new(),
            tool_seed: None,
            current_stage: StageType::Scenario,
            completed_stages: Vec::new(),
            status: TaskStatus::InProgress,
            stage_status: StageStatus::Initialized,
            session_id: pbl_core::SessionId::from_string("ses-p"),
            trace_root_id: None,
        },
    )
}

#[test]
fn open_creates_layout() {
    let dir = tempdir().unwrap();
    let _persistence = JsonPersistence::open(dir.path()).unwrap();
    assert!(dir.path().join("tasks").is_dir());
    assert!(dir.path().join("events").is_dir());
}

#[test]
fn snapshot_roundtrip() {
    let dir = tempdir().unwrap();
    let persistence = JsonPersistence::open(dir.path()).unwrap();
    let task = Task::builder().build();
    persistence.save_snapshot(&task).unwrap();
    let loaded = persistence.load_snapshot(&task.task_id).unwrap().unwrap();
    assert_eq!(loaded, task);
}

#[test]
fn snapshot_overwrites_prior_version() {
    let dir = tempdir().unwrap();
    let persistence = JsonPersistence::open(dir.path()).unwrap();
    let mut task = Task::builder().build();
    persistence.save_snapshot(&task).unwrap();
    task.working_memory.focus = "updated".into();
    persistence.save_snapshot(&task).unwrap();
    let loaded = persistence.load_snapshot(&task.task_id).unwrap().unwrap();
    assert_eq!(loaded.working_memory.focus, "updated");
}

#[test]
fn missing_snapshot_is_none() {
    let dir = tempdir().unwrap();
    let persistence = JsonPersistence::open(dir.path()).unwrap();
    assert!(persistence.load_snapshot("tsk-none").unwrap().is_none());
}

#[test]
fn events_append_in_order() {
    let dir = tempdir().unwrap();
    let persistence = JsonPersistence::open(dir.path()).unwrap();
    let task_id = TaskId::new();
    let first = created_event(task_id, 0);
    let second = Event::new(
        task_id,
        Some(StageType::Scenario),
        ts(1),
        EventPayload::CandidateSelected { candidate_id: "A".into() },
    );
    persistence.append_event(&first).unwrap();
    persistence.append_event(&second).unwrap();
    let events = persistence.load_events(&task_id).unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0], first);
    assert_eq!(events[1], second);
}

#[test]
fn empty_log_loads_empty() {
    let dir = tempdir().unwrap();
    let persistence = JsonPersistence::open(dir.path()).unwrap();
    assert!(persistence.load_events("tsk-none").unwrap().is_empty());
    assert!(persistence.replay_task(TaskId::from_string("tsk-none")).unwrap().is_none());
}

#[test]
fn replay_matches_snapshot() {
    let dir = tempdir().unwrap();
    let persistence = JsonPersistence::open(dir.path()).unwrap();
    let task_id = TaskId::new();
    let mut task = Task::seed(task_id);

    let events = vec![
        created_event(task_id, 0),
        Event::new(
            task_id,
            Some(StageType::Scenario),
            ts(1),
            EventPayload::CandidatesGenerated {
                revision_id: RevisionId::from_string("rev-1"),
                candidates: vec![Candidate::builder().id("A").build()],
                generation_context: None,
            },
        ),
        Event::new(
            task_id,
            Some(StageType::Scenario),
            ts(2),
            EventPayload::CandidateSelected { candidate_id: "A".into() },
        ),
    ];
    for event in &events {
        task = apply_event(task, event);
        persistence.save_snapshot(&task).unwrap();
        persistence.append_event(event).unwrap();
    }

    let snapshot = persistence.load_snapshot(&task_id).unwrap().unwrap();
    let replayed = persistence.replay_task(task_id).unwrap().unwrap();
    assert_eq!(replayed, snapshot);
}
