// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stage artifact: the per-stage container of candidates, revisions,
//! selection state, and warnings.

use crate::candidate::{Candidate, GenerationContext};
use crate::types::{CandidateStatus, StageStatus, StageType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Identifier for one installed candidate batch of a stage.
    pub struct RevisionId("rev-");
}

/// Frozen snapshot of a superseded revision, or a feedback record.
///
/// Feedback entries have `reason = "feedback"`, no candidates, and the
/// feedback text set; revision entries carry the frozen candidate list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_id: Option<RevisionId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<Candidate>,
    pub timestamp: DateTime<Utc>,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

/// Per-stage container of generation state.
///
/// Invariant: `selected_candidate_id` is non-empty ⇒ exactly one candidate
/// has `status = selected` and all others are `frozen`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageArtifact {
    pub stage: StageType,
    pub revision_id: RevisionId,
    pub status: StageStatus,
    #[serde(default)]
    pub iteration_count: u32,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_candidate_id: Option<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    /// Prior revisions and feedback records, newest last.
    #[serde(default)]
    pub history: Vec<RevisionSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_context: Option<GenerationContext>,
}

impl StageArtifact {
    pub fn new(stage: StageType) -> Self {
        Self {
            stage,
            revision_id: RevisionId::new(),
            status: StageStatus::Initialized,
            iteration_count: 0,
            candidates: Vec::new(),
            selected_candidate_id: None,
            warnings: Vec::new(),
            history: Vec::new(),
            generation_context: None,
        }
    }

    pub fn candidate(&self, id: &str) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == id)
    }

    /// The currently selected candidate, when the selection invariant holds.
    pub fn selected_candidate(&self) -> Option<&Candidate> {
        let id = self.selected_candidate_id.as_deref()?;
        self.candidate(id)
    }

    /// All non-selected candidates frozen, order preserved.
    pub fn frozen_candidates(&self) -> Vec<Candidate> {
        self.candidates.iter().map(Candidate::frozen).collect()
    }

    /// Verify the exactly-one-selection invariant.
    pub fn selection_consistent(&self) -> bool {
        match &self.selected_candidate_id {
            None => true,
            Some(id) => {
                let mut selected = 0usize;
                let mut matched = false;
                for cand in &self.candidates {
                    match cand.status {
                        CandidateStatus::Selected => {
                            selected += 1;
                            if &cand.id == id {
                                matched = true;
                            }
                        }
                        CandidateStatus::Frozen => {}
                        CandidateStatus::Generated => return false,
                    }
                }
                selected == 1 && matched
            }
        }
    }
}

crate::builder! {
    pub struct StageArtifactBuilder => StageArtifact {
        set {
            stage: StageType = StageType::Scenario,
            status: StageStatus = StageStatus::PendingChoice,
            iteration_count: u32 = 0,
            candidates: Vec<Candidate> = Vec::new(),
            warnings: Vec<String> = Vec::new(),
            history: Vec<RevisionSnapshot> = Vec::new(),
        }
        option {
            selected_candidate_id: String = None,
            generation_context: GenerationContext = None,
        }
        computed {
            revision_id: RevisionId = RevisionId::new(),
        }
    }
}

#[cfg(test)]
#[path = "artifact_tests.rs"]
mod tests;
