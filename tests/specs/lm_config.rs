// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! LM configuration gating and input validation boundaries.

use pbl_adapters::{LmError, TraceManager, UnconfiguredLm};
use pbl_core::{EntryPoint, FakeClock};
use pbl_engine::{
    ActionPayload, ActionRequest, Api, CreateTaskRequest, EngineConfig, EventBus, Orchestrator,
    OrchestratorDeps, OrchestratorError,
};
use pbl_storage::{JsonPersistence, TaskStore};
use serde_json::json;
use std::sync::Arc;

fn unconfigured_api(llm_required: bool) -> (Api, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let orchestrator = Orchestrator::new(OrchestratorDeps {
        store: Arc::new(TaskStore::new()),
        persistence: Arc::new(JsonPersistence::open(dir.path()).expect("persistence")),
        bus: Arc::new(EventBus::new()),
        lm: Arc::new(UnconfiguredLm),
        clock: Arc::new(FakeClock::new()),
        tracer: Arc::new(TraceManager::disabled()),
        config: EngineConfig { llm_required, ..EngineConfig::default() },
    });
    (Api::new(orchestrator), dir)
}

#[tokio::test]
async fn missing_credentials_fail_creation_when_required() {
    let (api, _dir) = unconfigured_api(true);
    let err = api
        .create_task(CreateTaskRequest {
            entry_point: EntryPoint::Scenario,
            scenario: Some(json!("Test scenario")),
            tool_seed: None,
        })
        .await
        .expect_err("should fail");
    assert!(matches!(
        err,
        OrchestratorError::Lm(LmError::ConfigurationMissing(_))
    ));
}

#[tokio::test]
async fn empty_scenario_is_a_validation_error() {
    let (api, _dir) = unconfigured_api(false);
    let err = api
        .create_task(CreateTaskRequest {
            entry_point: EntryPoint::Scenario,
            scenario: Some(json!("")),
            tool_seed: None,
        })
        .await
        .expect_err("should fail");
    assert!(matches!(err, OrchestratorError::Validation(ref m) if m.contains("scenario")));
}

#[tokio::test]
async fn malformed_tool_seed_is_a_validation_error() {
    let (api, _dir) = unconfigured_api(false);
    let err = api
        .create_task(CreateTaskRequest {
            entry_point: EntryPoint::ToolSeed,
            scenario: None,
            tool_seed: Some(json!({"algorithms": ["KNN"]})),
        })
        .await
        .expect_err("should fail");
    assert!(matches!(err, OrchestratorError::Validation(_)));
}

#[tokio::test]
async fn unknown_task_is_not_found() {
    let (api, _dir) = unconfigured_api(false);
    let err = api
        .task_action(
            "tsk-missing",
            ActionRequest { action: "select".into(), payload: ActionPayload::default() },
        )
        .await
        .expect_err("should fail");
    assert!(matches!(err, OrchestratorError::NotFound));
}
