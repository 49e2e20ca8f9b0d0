// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Activity ↔ question-chain ↔ tool-seed alignment checks.

use super::ValidationResult;
use pbl_core::{Conflict, ConflictId, ConflictOption, ConflictSeverity, StageType, ToolSeed};

// Canonical sub-question markers accepted in place of literal question
// text, one group per sub-question.
const MARKER_GROUPS: [[&str; 3]; 3] = [
    ["子问题1", "Sub-question 1", "Q1"],
    ["子问题2", "Sub-question 2", "Q2"],
    ["子问题3", "Sub-question 3", "Q3"],
];

fn has_all_markers(text: &str) -> bool {
    MARKER_GROUPS.iter().all(|group| group.iter().any(|marker| text.contains(marker)))
}

/// Check the selected activity text against the tool seed and the selected
/// question chain.
///
/// Severity ladder: topic and chain both missing → blocking; one of them
/// missing → warning; only tool constraints missing → info.
pub fn validate_activity_alignment(
    tool_seed: &ToolSeed,
    question_chain: &[String],
    activity_text: &str,
) -> ValidationResult {
    let mut warnings = Vec::new();
    let mut missing_topic = false;
    let mut missing_chain = false;

    let topic = tool_seed.topic();
    if !topic.is_empty() && !activity_text.contains(&topic) {
        missing_topic = true;
        warnings.push("Activity does not mention the topic keyword.".to_string());
    }

    if !question_chain.is_empty() {
        let literal_hit = question_chain
            .iter()
            .any(|q| !q.is_empty() && activity_text.contains(q.as_str()));
        if !literal_hit && !has_all_markers(activity_text) {
            missing_chain = true;
            warnings.push("Activity does not reflect the question chain.".to_string());
        }
    }

    let tool_constraints = tool_seed.constraint_str("tool_constraints");
    if !tool_constraints.is_empty() && !activity_text.contains(&tool_constraints) {
        warnings.push("Activity does not mention tool constraints.".to_string());
    }

    if warnings.is_empty() {
        return ValidationResult::default();
    }

    let severity = if missing_topic && missing_chain {
        ConflictSeverity::Blocking
    } else if missing_topic || missing_chain {
        ConflictSeverity::Warning
    } else {
        ConflictSeverity::Info
    };

    let conflict = Conflict {
        conflict_id: ConflictId::new(),
        stage: StageType::Activity,
        severity,
        summary: "Activity alignment with tool_seed/question_chain is insufficient.".to_string(),
        warnings: warnings.clone(),
        conflict_options: vec![
            ConflictOption::new(
                "A",
                "Adjust tool_seed parameters",
                "Modify tool_seed topic, constraints, or context to fit the activity.",
            ),
            ConflictOption::new(
                "B",
                "Select a different question chain",
                "Choose or regenerate a question_chain that matches the activity.",
            ),
            ConflictOption::new(
                "C",
                "Generate a compromise plan",
                "Produce a compromise plan and note the trade-offs.",
            ),
        ],
        recommendation: "Align the question chain and topic first, then refine activity details."
            .to_string(),
        resolved: false,
        resolved_option: None,
    };

    ValidationResult { warnings, conflicts: vec![conflict], recommendation: None }
}

#[cfg(test)]
#[path = "activity_alignment_tests.rs"]
mod tests;
