// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Creative dialogue: LM-backed intent extraction and explicit intent
//! edits.

use crate::generators::parse::extract_json;
use crate::generators::prompts::{render, PromptLibrary};
use crate::intake::Intake;
use pbl_adapters::{LmClient, LmError, LmRequest};
use pbl_core::CreativeContext;
use serde_json::{json, Value};
use std::sync::{Arc, OnceLock};

/// Command-style intent edits, e.g. `修改意图: 做一个气象站项目`.
pub const INTENT_EDIT_PATTERN: &str = r"(修改意图|调整意图|变更意图|意图改为|意图改成)[:：]?\s*(.*)";

fn intent_edit_regex() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| {
        #[allow(clippy::unwrap_used)]
        regex::Regex::new(INTENT_EDIT_PATTERN).unwrap()
    })
}

/// Structured outcome of one intent-extraction call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntentExtraction {
    pub intent: String,
    pub key_constraints: Vec<String>,
    pub anchor_concepts: Vec<String>,
    pub needs_confirmation: bool,
    pub question: Option<String>,
    pub summary: String,
}

pub struct CreativeDialogueManager {
    lm: Arc<dyn LmClient>,
    prompts: Arc<PromptLibrary>,
}

impl CreativeDialogueManager {
    pub fn new(lm: Arc<dyn LmClient>, prompts: Arc<PromptLibrary>) -> Self {
        Self { lm, prompts }
    }

    /// The new intent named by an explicit edit command, if the input is one.
    pub fn parse_intent_edit(input: &str) -> Option<String> {
        let captures = intent_edit_regex().captures(input)?;
        let intent = captures.get(2).map(|m| m.as_str().trim()).unwrap_or("");
        (!intent.is_empty()).then(|| intent.to_string())
    }

    /// Ask the LM to distill intent, constraints, and anchors from the
    /// conversation.
    pub async fn extract(
        &self,
        context: &CreativeContext,
        user_input: &str,
        intake: Option<&Intake>,
        recent_messages: &[String],
    ) -> Result<IntentExtraction, LmError> {
        let intake_json = intake
            .map(|i| serde_json::to_value(i).unwrap_or(Value::Null))
            .unwrap_or(Value::Null);
        let prompt = render(
            &self.prompts.creative_intent,
            &[
                ("intent", context.original_intent.as_str()),
                ("constraints", &json!(context.key_constraints).to_string()),
                ("anchors", &json!(context.anchor_concepts).to_string()),
                ("intake", &intake_json.to_string()),
                ("recent", &json!(recent_messages).to_string()),
                ("text", user_input),
            ],
        );
        let response = self.lm.complete(LmRequest::new(prompt)).await?;
        let data = extract_json(&response).map_err(|e| LmError::Invocation(e.to_string()))?;

        let intent = data.get("intent").and_then(Value::as_str).unwrap_or("").trim().to_string();
        let key_constraints = string_list(data.get("key_constraints"));
        let anchor_concepts = string_list(data.get("anchor_concepts"));
        let needs_confirmation =
            data.get("needs_confirmation").and_then(Value::as_bool).unwrap_or(false);
        let mut question = data
            .get("question")
            .and_then(Value::as_str)
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());
        if needs_confirmation && question.is_none() {
            question = Some("Could you add one line about the goal, setting, or tool?".into());
        }
        let summary = data.get("summary").and_then(Value::as_str).unwrap_or("").trim().to_string();

        Ok(IntentExtraction {
            intent,
            key_constraints,
            anchor_concepts,
            needs_confirmation,
            question,
            summary,
        })
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.trim().to_string(),
                other => other.to_string(),
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        Some(Value::Object(map)) => map
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| format!("{k}:{}", pbl_core::value_to_text(v)))
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
#[path = "creative_tests.rs"]
mod tests;
