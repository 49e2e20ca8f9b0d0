// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Intake normalization: classroom intake records become generation
//! constraints.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Minutes per lesson when converting lesson counts to durations.
pub const LESSON_MINUTES: u32 = 40;

/// Raw intake record from the chat surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Intake {
    #[serde(default)]
    pub knowledge_point: String,
    #[serde(default)]
    pub lesson_count: Option<u32>,
    #[serde(default)]
    pub age_group: String,
    #[serde(default)]
    pub classroom_type: String,
}

impl Intake {
    pub fn is_empty(&self) -> bool {
        self.knowledge_point.trim().is_empty()
            && self.lesson_count.is_none()
            && self.age_group.trim().is_empty()
            && self.classroom_type.trim().is_empty()
    }
}

/// Map a classroom type label to its mode key. Unknown labels are `normal`.
pub fn classroom_mode(classroom_type: &str) -> &'static str {
    match classroom_type.trim() {
        "机房" => "computer_lab",
        "通识课实验室" => "general_lab",
        _ => "normal",
    }
}

/// Expand an intake record into the recognized constraint keys.
pub fn intake_to_constraints(intake: &Intake) -> Map<String, Value> {
    let mut constraints = Map::new();
    if intake.is_empty() {
        return constraints;
    }
    let lesson_count = intake.lesson_count.unwrap_or(1).max(1);
    constraints.insert("topic".into(), json!(intake.knowledge_point.trim()));
    constraints.insert("lesson_count".into(), json!(lesson_count));
    constraints.insert("duration".into(), json!(lesson_count * LESSON_MINUTES));
    constraints.insert("grade".into(), json!(intake.age_group.trim()));
    constraints.insert("classroom_mode".into(), json!(classroom_mode(&intake.classroom_type)));
    constraints.insert("classroom_context".into(), json!(intake.classroom_type.trim()));
    constraints
}

#[cfg(test)]
#[path = "intake_tests.rs"]
mod tests;
