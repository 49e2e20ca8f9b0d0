// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Result-style validators: findings come back as warnings and conflicts,
//! never as control-flow errors.

pub mod activity_alignment;
pub mod realism;

pub use activity_alignment::validate_activity_alignment;

use pbl_core::{Candidate, Conflict};

/// Outcome of one validator pass.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub warnings: Vec<String>,
    pub conflicts: Vec<Conflict>,
    pub recommendation: Option<String>,
}

impl ValidationResult {
    pub fn merge(&mut self, other: ValidationResult) {
        self.warnings.extend(other.warnings);
        self.conflicts.extend(other.conflicts);
        if self.recommendation.is_none() {
            self.recommendation = other.recommendation;
        }
    }
}

/// Warn when a generation batch came back empty.
pub fn validate_non_empty(candidates: &[Candidate]) -> ValidationResult {
    let mut result = ValidationResult::default();
    if candidates.is_empty() {
        result.warnings.push("No candidates generated.".to_string());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_batch_warns() {
        let result = validate_non_empty(&[]);
        assert_eq!(result.warnings, vec!["No candidates generated."]);
        assert!(result.conflicts.is_empty());
    }

    #[test]
    fn non_empty_batch_is_clean() {
        let candidates = vec![pbl_core::Candidate::builder().build()];
        assert!(validate_non_empty(&candidates).warnings.is_empty());
    }

    #[test]
    fn merge_concatenates_findings() {
        let mut a = ValidationResult {
            warnings: vec!["w1".into()],
            conflicts: Vec::new(),
            recommendation: None,
        };
        let b = ValidationResult {
            warnings: vec!["w2".into()],
            conflicts: vec![pbl_core::Conflict::builder().build()],
            recommendation: Some("fix it".into()),
        };
        a.merge(b);
        assert_eq!(a.warnings.len(), 2);
        assert_eq!(a.conflicts.len(), 1);
        assert_eq!(a.recommendation.as_deref(), Some("fix it"));
    }
}
