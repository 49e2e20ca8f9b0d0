// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rule-first entry classification: strong phrases, then domain keywords.

use pbl_core::EntryPoint;

const STRONG_SCENARIO_PHRASES: &[&str] = &[
    "从场景开始",
    "从情境开始",
    "从场景",
    "从情境",
    "start from scenario",
    "from scenario",
];

const STRONG_TOOL_PHRASES: &[&str] = &[
    "从工具开始",
    "从实验开始",
    "从活动开始",
    "从驱动问题开始",
    "从项目开始",
    "从工具",
    "从实验",
    "从活动",
    "从驱动问题",
    "start from tool",
    "start from experiment",
    "start from activity",
    "start from driving question",
];

const SCENARIO_KEYWORDS: &[&str] = &["场景", "情境", "真实任务", "生活问题", "scenario"];

const TOOL_KEYWORDS: &[&str] = &[
    "工具",
    "软件",
    "实验",
    "活动",
    "驱动问题",
    "项目任务",
    "project",
    "activity",
    "experiment",
    "driving question",
    "question chain",
    "orange",
    "weka",
    "scratch",
    "python",
    "jupyter",
    "colab",
    "excel",
    "power bi",
    "pytorch",
    "tensorflow",
    "sklearn",
    "scikit",
    "matlab",
    "rapidminer",
];

/// Result of one rule pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    /// `None` when both sides hit (ambiguous) or nothing hit.
    pub choice: Option<EntryPoint>,
    pub hits: Vec<String>,
}

fn contains<'a>(text: &str, keywords: &'a [&'a str]) -> Vec<&'a str> {
    let lowered = text.to_lowercase();
    keywords.iter().copied().filter(|kw| lowered.contains(&kw.to_lowercase())).collect()
}

fn tagged(prefix: &str, side: &str, hits: &[&str]) -> Vec<String> {
    hits.iter().map(|h| format!("{prefix}:{side}:{h}")).collect()
}

/// Phrase-level signals that explicitly name the starting point.
pub fn apply_strong_signals(text: &str) -> RuleOutcome {
    let scenario_hits = contains(text, STRONG_SCENARIO_PHRASES);
    let tool_hits = contains(text, STRONG_TOOL_PHRASES);
    match (scenario_hits.is_empty(), tool_hits.is_empty()) {
        (false, false) => {
            let mut hits = tagged("strong", "scenario", &scenario_hits);
            hits.extend(tagged("strong", "tool_seed", &tool_hits));
            RuleOutcome { choice: None, hits }
        }
        (false, true) => RuleOutcome {
            choice: Some(EntryPoint::Scenario),
            hits: tagged("strong", "scenario", &scenario_hits),
        },
        (true, false) => RuleOutcome {
            choice: Some(EntryPoint::ToolSeed),
            hits: tagged("strong", "tool_seed", &tool_hits),
        },
        (true, true) => RuleOutcome { choice: None, hits: Vec::new() },
    }
}

/// Weaker domain-keyword signals.
pub fn apply_keyword_rules(text: &str) -> RuleOutcome {
    let scenario_hits = contains(text, SCENARIO_KEYWORDS);
    let tool_hits = contains(text, TOOL_KEYWORDS);
    match (scenario_hits.is_empty(), tool_hits.is_empty()) {
        (false, false) => {
            let mut hits = tagged("keyword", "scenario", &scenario_hits);
            hits.extend(tagged("keyword", "tool_seed", &tool_hits));
            RuleOutcome { choice: None, hits }
        }
        (false, true) => RuleOutcome {
            choice: Some(EntryPoint::Scenario),
            hits: tagged("keyword", "scenario", &scenario_hits),
        },
        (true, false) => RuleOutcome {
            choice: Some(EntryPoint::ToolSeed),
            hits: tagged("keyword", "tool_seed", &tool_hits),
        },
        (true, true) => RuleOutcome { choice: None, hits: Vec::new() },
    }
}

/// Whether the utterance names either domain at all (used to suppress the
/// divergence prompt).
pub fn has_entry_keywords(text: &str) -> bool {
    !contains(text, SCENARIO_KEYWORDS).is_empty() || !contains(text, TOOL_KEYWORDS).is_empty()
}

/// A known tool name mentioned in the text, for tool-seed backfill.
pub fn known_tool_in(text: &str) -> Option<&'static str> {
    const TOOL_NAMES: &[&str] = &[
        "orange", "weka", "scratch", "python", "jupyter", "colab", "excel", "power bi",
        "pytorch", "tensorflow", "sklearn", "scikit", "matlab", "rapidminer",
    ];
    let lowered = text.to_lowercase();
    TOOL_NAMES.iter().copied().find(|name| lowered.contains(name))
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod tests;
