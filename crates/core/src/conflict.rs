// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validator-detected conflicts and their resolution options.

use crate::types::{ConflictSeverity, StageType};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a conflict.
    pub struct ConflictId("cfl-");
}

/// A single option the user can choose to resolve a conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictOption {
    pub option: String,
    pub title: String,
    pub description: String,
}

impl ConflictOption {
    pub fn new(
        option: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self { option: option.into(), title: title.into(), description: description.into() }
    }
}

/// A validator finding attached to a stage.
///
/// Blocking conflicts gate finalization until resolved. Resolution is
/// idempotent: resolving an already-resolved conflict is a no-op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub conflict_id: ConflictId,
    pub stage: StageType,
    pub severity: ConflictSeverity,
    pub summary: String,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub conflict_options: Vec<ConflictOption>,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub resolved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_option: Option<String>,
}

impl Conflict {
    pub fn is_blocking(&self) -> bool {
        self.severity == ConflictSeverity::Blocking && !self.resolved
    }

    /// Copy marked resolved with the chosen option.
    pub fn resolve(&self, option: impl Into<String>) -> Self {
        Self { resolved: true, resolved_option: Some(option.into()), ..self.clone() }
    }
}

crate::builder! {
    pub struct ConflictBuilder => Conflict {
        into {
            summary: String = "Alignment insufficient",
            recommendation: String = "",
        }
        set {
            stage: StageType = StageType::Activity,
            severity: ConflictSeverity = ConflictSeverity::Blocking,
            warnings: Vec<String> = Vec::new(),
            conflict_options: Vec<ConflictOption> = Vec::new(),
            resolved: bool = false,
        }
        option {
            resolved_option: String = None,
        }
        computed {
            conflict_id: ConflictId = ConflictId::new(),
        }
    }
}

#[cfg(test)]
#[path = "conflict_tests.rs"]
mod tests;
