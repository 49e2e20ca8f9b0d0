// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for the orchestration layer.

use pbl_adapters::LmError;
use pbl_storage::PersistenceError;
use thiserror::Error;

/// Errors surfaced from orchestrator entry points.
///
/// `Validation` never mutates task state and never emits events; the other
/// non-validation variants are recorded as `error_raised` where a task
/// exists to record them on.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Malformed client input. Recovered by the caller.
    #[error("{0}")]
    Validation(String),

    /// Unknown task id.
    #[error("Task not found")]
    NotFound,

    /// The stage state machine rejects this action.
    #[error("Action not allowed in current stage status")]
    ActionNotAllowed,

    /// LM configuration or invocation failure.
    #[error(transparent)]
    Lm(#[from] LmError),

    /// Candidate generation failed (duplicates, insufficient output).
    #[error("{0}")]
    Generation(String),

    /// Snapshot or event-log write failure.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl OrchestratorError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether this error must never emit an `error_raised` event.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotFound | Self::ActionNotAllowed)
    }
}
