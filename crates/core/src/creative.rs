// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Creative context and working memory tracked alongside stage work.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on retained working-memory notes.
pub const MAX_WORKING_NOTES: usize = 10;

/// One recorded change of the user's creative intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentRevision {
    pub timestamp: DateTime<Utc>,
    /// What caused the revision, e.g. "explicit_edit" or "dialogue".
    pub trigger: String,
    pub before: String,
    pub after: String,
    #[serde(default)]
    pub user_confirmed: bool,
}

/// The evolving creative frame of the task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreativeContext {
    #[serde(default)]
    pub original_intent: String,
    #[serde(default)]
    pub intent_evolution: Vec<IntentRevision>,
    #[serde(default)]
    pub key_constraints: Vec<String>,
    #[serde(default)]
    pub preferred_style: String,
    #[serde(default)]
    pub anchor_concepts: Vec<String>,
}

impl CreativeContext {
    /// Merge new items, de-duplicating while preserving first-seen order.
    pub fn merge_constraints(&mut self, items: &[String]) {
        merge_unique(&mut self.key_constraints, items);
    }

    pub fn merge_anchors(&mut self, items: &[String]) {
        merge_unique(&mut self.anchor_concepts, items);
    }
}

fn merge_unique(target: &mut Vec<String>, items: &[String]) {
    for item in items {
        let trimmed = item.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !target.iter().any(|existing| existing == trimmed) {
            target.push(trimmed.to_string());
        }
    }
}

/// Short-horizon focus plus a bounded note ring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkingMemory {
    #[serde(default)]
    pub focus: String,
    #[serde(default)]
    pub notes: Vec<String>,
}

impl WorkingMemory {
    /// Append a note, keeping only the most recent [`MAX_WORKING_NOTES`].
    pub fn push_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
        self.truncate();
    }

    /// Drop all but the most recent [`MAX_WORKING_NOTES`] entries.
    pub fn truncate(&mut self) {
        if self.notes.len() > MAX_WORKING_NOTES {
            let drop = self.notes.len() - MAX_WORKING_NOTES;
            self.notes.drain(..drop);
        }
    }
}

#[cfg(test)]
#[path = "creative_tests.rs"]
mod tests;
