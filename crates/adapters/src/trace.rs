// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured run/child spans for task flows.
//!
//! Spans surface as `tracing` events; large payload strings are replaced by
//! short digests so prompts and scenario texts never land in logs verbatim.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Strings longer than this are digested before logging.
const SANITIZE_THRESHOLD: usize = 200;

fn hash_text(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    hex[..12].to_string()
}

/// Replace long string values with `hash:<12-hex>` markers.
pub fn sanitize_payload(payload: &Map<String, Value>) -> Map<String, Value> {
    let mut sanitized = Map::new();
    for (key, value) in payload {
        let clean = match value {
            Value::String(s) if s.len() > SANITIZE_THRESHOLD => {
                Value::String(format!("hash:{}", hash_text(s)))
            }
            other => other.clone(),
        };
        sanitized.insert(key.clone(), clean);
    }
    sanitized
}

/// One child span record.
#[derive(Debug, Clone, Default)]
pub struct ChildSpan {
    pub name: String,
    pub run_type: String,
    pub inputs: Map<String, Value>,
    pub outputs: Map<String, Value>,
    pub metadata: Map<String, Value>,
    pub error: Option<String>,
    pub elapsed_ms: Option<u64>,
}

impl ChildSpan {
    pub fn new(name: impl Into<String>, run_type: impl Into<String>) -> Self {
        Self { name: name.into(), run_type: run_type.into(), ..Self::default() }
    }

    pub fn input(mut self, key: impl Into<String>, value: Value) -> Self {
        self.inputs.insert(key.into(), value);
        self
    }

    pub fn output(mut self, key: impl Into<String>, value: Value) -> Self {
        self.outputs.insert(key.into(), value);
        self
    }

    pub fn meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Span recorder for task runs.
///
/// Disabled unless `TRACE_ENABLED` is truthy; the project name comes from
/// `TRACE_PROJECT`.
pub struct TraceManager {
    enabled: bool,
    project: Option<String>,
}

impl TraceManager {
    pub fn from_env() -> Self {
        let enabled = std::env::var("TRACE_ENABLED")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);
        let project = std::env::var("TRACE_PROJECT").ok().filter(|p| !p.trim().is_empty());
        Self { enabled, project }
    }

    pub fn disabled() -> Self {
        Self { enabled: false, project: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Open the root span for a task run. Returns the run id to thread
    /// through events, or `None` when tracing is off.
    pub fn start_root(&self, task_id: &str, entry_point: &str, action: &str) -> Option<String> {
        if !self.enabled {
            return None;
        }
        let run_id = uuid::Uuid::new_v4().to_string();
        tracing::debug!(
            run_id,
            task_id,
            entry_point,
            action,
            project = self.project.as_deref().unwrap_or(""),
            "trace root started"
        );
        Some(run_id)
    }

    pub fn end_root(&self, run_id: Option<&str>, status: &str) {
        let Some(run_id) = run_id else { return };
        if !self.enabled {
            return;
        }
        tracing::debug!(run_id, status, "trace root ended");
    }

    /// Record one child span under a root run.
    pub fn log_child(&self, root_run_id: Option<&str>, span: ChildSpan) {
        if !self.enabled {
            return;
        }
        let inputs = sanitize_payload(&span.inputs);
        let outputs = sanitize_payload(&span.outputs);
        let inputs_json = Value::Object(inputs);
        let outputs_json = Value::Object(outputs);
        let metadata_json = Value::Object(span.metadata.clone());
        match &span.error {
            Some(error) => tracing::debug!(
                root_run_id = root_run_id.unwrap_or(""),
                name = span.name,
                run_type = span.run_type,
                inputs = %inputs_json,
                outputs = %outputs_json,
                metadata = %metadata_json,
                elapsed_ms = span.elapsed_ms,
                error = %error,
                "trace child failed"
            ),
            None => tracing::debug!(
                root_run_id = root_run_id.unwrap_or(""),
                name = span.name,
                run_type = span.run_type,
                inputs = %inputs_json,
                outputs = %outputs_json,
                metadata = %metadata_json,
                elapsed_ms = span.elapsed_ms,
                "trace child"
            ),
        }
    }
}

#[cfg(test)]
#[path = "trace_tests.rs"]
mod tests;
