// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Interaction routing between exploring and generating modes.

use super::divergence_score;
use pbl_core::DialogueState;

/// Drift at or above this sends the dialogue back to exploring.
const DRIFT_THRESHOLD: f64 = 0.6;

const CONFIRMATION_TERMS: &[&str] = &["确认", "选择", "定稿", "进入下一步"];

/// Stateless router over dialogue modes.
#[derive(Debug, Default, Clone, Copy)]
pub struct InteractionRouter;

impl InteractionRouter {
    /// Decide the next dialogue state for a user input.
    ///
    /// Empty input keeps the current state; heavy drift from recent history
    /// returns to exploring; explicit confirmation terms move to
    /// generating; otherwise the state is unchanged.
    pub fn route(
        &self,
        user_input: &str,
        history: &[String],
        current_state: DialogueState,
    ) -> DialogueState {
        let text = user_input.trim();
        if text.is_empty() {
            return current_state;
        }
        if self.detect_intent_shift(history, text) >= DRIFT_THRESHOLD {
            return DialogueState::Exploring;
        }
        if CONFIRMATION_TERMS.iter().any(|term| text.contains(term)) {
            return DialogueState::Generating;
        }
        current_state
    }

    /// Token-overlap drift of the input against the last three history
    /// entries. No history means no drift.
    pub fn detect_intent_shift(&self, history: &[String], new_input: &str) -> f64 {
        if history.is_empty() {
            return 0.0;
        }
        let start = history.len().saturating_sub(3);
        let recent = history[start..].join(" ");
        divergence_score(&recent, new_input)
    }
}
