// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use serial_test::serial;

#[test]
fn long_strings_are_digested() {
    let mut payload = Map::new();
    payload.insert("prompt".into(), json!("x".repeat(500)));
    payload.insert("stage".into(), json!("scenario"));
    let sanitized = sanitize_payload(&payload);
    let digested = sanitized["prompt"].as_str().unwrap();
    assert!(digested.starts_with("hash:"));
    assert_eq!(digested.len(), "hash:".len() + 12);
    assert_eq!(sanitized["stage"], "scenario");
}

#[test]
fn digests_are_stable() {
    let mut payload = Map::new();
    payload.insert("text".into(), json!("y".repeat(300)));
    let a = sanitize_payload(&payload);
    let b = sanitize_payload(&payload);
    assert_eq!(a, b);
}

#[test]
#[serial]
fn disabled_tracer_yields_no_run_ids() {
    std::env::remove_var("TRACE_ENABLED");
    let tracer = TraceManager::from_env();
    assert!(!tracer.is_enabled());
    assert!(tracer.start_root("tsk-1", "scenario", "task_created").is_none());
}

#[test]
#[serial]
fn enabled_tracer_allocates_unique_run_ids() {
    std::env::set_var("TRACE_ENABLED", "true");
    let tracer = TraceManager::from_env();
    assert!(tracer.is_enabled());
    let a = tracer.start_root("tsk-1", "scenario", "task_created").unwrap();
    let b = tracer.start_root("tsk-2", "tool_seed", "task_created").unwrap();
    assert_ne!(a, b);
    tracer.end_root(Some(a.as_str()), "completed");
    tracer.log_child(
        Some(a.as_str()),
        ChildSpan::new("generator:scenario", "tool")
            .input("stage", json!("scenario"))
            .output("count", json!(3)),
    );
    std::env::remove_var("TRACE_ENABLED");
}

#[test]
fn child_span_builder_accumulates() {
    let span = ChildSpan::new("api:action", "chain")
        .input("stage", json!("activity"))
        .output("conflicts", json!(1))
        .meta("task_id", json!("tsk-1"))
        .error("boom");
    assert_eq!(span.inputs["stage"], "activity");
    assert_eq!(span.error.as_deref(), Some("boom"));
}
