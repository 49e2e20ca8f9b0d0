// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The five production stage generators.

mod activity;
mod driving_question;
mod experiment;
mod question_chain;
mod scenario;

pub use activity::ActivityGenerator;
pub use driving_question::DrivingQuestionGenerator;
pub use experiment::ExperimentGenerator;
pub use question_chain::QuestionChainGenerator;
pub use scenario::ScenarioGenerator;

use super::parse::parse_question_chain;
use serde_json::{Map, Value};

/// Sub-questions every chain-bearing candidate must carry.
pub const CHAIN_LENGTH: usize = 3;

const CHAIN_PLACEHOLDER: &str = "TBD: add a sub-question.";

/// Force `question_chain` to exactly [`CHAIN_LENGTH`] entries: string
/// chains are parsed line-wise, short chains padded, long chains truncated.
pub(crate) fn enforce_chain_shape(raw: &mut Map<String, Value>) {
    let mut chain: Vec<String> = match raw.get("question_chain") {
        Some(Value::Array(items)) => items.iter().map(pbl_core::value_to_text).collect(),
        Some(Value::String(text)) => parse_question_chain(text),
        _ => Vec::new(),
    };
    chain.retain(|q| !q.trim().is_empty());
    chain.truncate(CHAIN_LENGTH);
    while chain.len() < CHAIN_LENGTH {
        chain.push(CHAIN_PLACEHOLDER.to_string());
    }
    raw.insert("question_chain".into(), Value::Array(chain.into_iter().map(Value::String).collect()));
}
