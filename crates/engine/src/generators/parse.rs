// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Robust parsing of LM output: fenced JSON, wrapped option lists, and
//! numbered question chains.

use serde_json::{Map, Value};

/// Parse failure for an LM response.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Empty LLM response")]
    Empty,
    #[error("No JSON found in LLM response")]
    NoJson,
    #[error("Invalid options payload")]
    InvalidOptions,
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the fence line.
    let rest = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest,
    };
    rest.trim_end_matches('`').trim()
}

fn slice_between(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

/// Extract the first JSON value from possibly-noisy LM output.
///
/// Tolerates code fences and prose around the JSON; objects are preferred
/// over arrays when both bracket styles appear.
pub fn extract_json(text: &str) -> Result<Value, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    let cleaned = strip_code_fence(text);
    if let Ok(value) = serde_json::from_str(cleaned) {
        return Ok(value);
    }
    if let Some(slice) = slice_between(cleaned, '{', '}') {
        if let Ok(value) = serde_json::from_str(slice) {
            return Ok(value);
        }
    }
    if let Some(slice) = slice_between(cleaned, '[', ']') {
        if let Ok(value) = serde_json::from_str(slice) {
            return Ok(value);
        }
    }
    Err(ParseError::NoJson)
}

/// Normalize an options payload into a list of option objects.
///
/// Accepts a bare list or a `{options: […]}` / `{candidates: […]}` /
/// `{items: […]}` wrapper; non-object entries are discarded.
pub fn normalize_options(payload: &Value) -> Result<Vec<Map<String, Value>>, ParseError> {
    let items = match payload {
        Value::Array(items) => items.clone(),
        Value::Object(map) => {
            let wrapped = map
                .get("options")
                .or_else(|| map.get("candidates"))
                .or_else(|| map.get("items"));
            match wrapped {
                Some(Value::Array(items)) => items.clone(),
                _ => return Err(ParseError::InvalidOptions),
            }
        }
        _ => return Err(ParseError::InvalidOptions),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect())
}

/// Parse numbered (`1.` / `1)` / `1、`) or bulleted (`-` / `*`) lines into a
/// question list.
pub fn parse_question_chain(text: &str) -> Vec<String> {
    let mut questions = Vec::new();
    for line in text.lines() {
        let cleaned = line.trim();
        if cleaned.is_empty() {
            continue;
        }
        if let Some(stripped) = strip_ordinal(cleaned) {
            questions.push(stripped.to_string());
            continue;
        }
        if let Some(rest) = cleaned.strip_prefix("- ").or_else(|| cleaned.strip_prefix("* ")) {
            let rest = rest.trim();
            if !rest.is_empty() {
                questions.push(rest.to_string());
            }
        }
    }
    questions
}

fn strip_ordinal(line: &str) -> Option<&str> {
    let digits_end = line.find(|c: char| !c.is_ascii_digit())?;
    if digits_end == 0 {
        return None;
    }
    let rest = &line[digits_end..];
    let rest = rest
        .strip_prefix('.')
        .or_else(|| rest.strip_prefix(')'))
        .or_else(|| rest.strip_prefix('、'))?;
    let rest = rest.trim();
    (!rest.is_empty()).then_some(rest)
}

/// Primary text of a raw option object for the given stage key.
///
/// Falls back through `content`, known stage keys, and `title` before
/// rendering the whole object as JSON.
pub fn option_text(raw: &Map<String, Value>, stage_key: &str) -> String {
    if let Some(content) = raw.get("content") {
        if let Value::Object(map) = content {
            if let Some(value) = map.get(stage_key) {
                return pbl_core::value_to_text(value);
            }
        }
    }
    if let Some(value) = raw.get(stage_key) {
        return pbl_core::value_to_text(value);
    }
    for key in ["driving_question", "question_chain", "scenario", "activity", "experiment", "title"]
    {
        if let Some(value) = raw.get(key) {
            return pbl_core::value_to_text(value);
        }
    }
    Value::Object(raw.clone()).to_string()
}

/// Trimmed one-line summary capped at `limit` characters.
pub fn summarize(text: &str, limit: usize) -> String {
    let flattened = text.trim().replace('\n', " ");
    flattened.chars().take(limit).collect()
}

#[cfg(test)]
#[path = "parse_tests.rs"]
mod tests;
