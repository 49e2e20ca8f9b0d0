// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Distinctness checks: normalized character 3-gram Jaccard similarity
//! against a rolling "seen" set.

use super::parse::summarize;
use pbl_core::{StageType, Task};
use std::collections::HashSet;
use std::sync::OnceLock;

/// Similarity at or above this is a duplicate.
pub const DUPLICATE_THRESHOLD: f64 = 0.85;

/// Most prior candidate texts carried in an avoid list.
pub const MAX_AVOID_ITEMS: usize = 6;

const SUMMARY_LIMIT: usize = 160;

fn word_or_cjk() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Keep word characters and CJK ideographs; drop everything else.
        #[allow(clippy::unwrap_used)]
        regex::Regex::new(r"[^\w\u{4e00}-\u{9fff}]+").unwrap()
    })
}

/// Lowercase and strip non-word, non-CJK characters.
pub fn normalize_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    word_or_cjk().replace_all(&lowered, "").into_owned()
}

fn ngrams(text: &str, n: usize) -> HashSet<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return HashSet::new();
    }
    if chars.len() <= n {
        let mut set = HashSet::new();
        set.insert(text.to_string());
        return set;
    }
    (0..=chars.len() - n).map(|i| chars[i..i + n].iter().collect()).collect()
}

/// Character 3-gram Jaccard similarity of the normalized texts.
pub fn similarity(a: &str, b: &str) -> f64 {
    let norm_a = normalize_text(a);
    let norm_b = normalize_text(b);
    if norm_a.is_empty() || norm_b.is_empty() {
        return 0.0;
    }
    let grams_a = ngrams(&norm_a, 3);
    let grams_b = ngrams(&norm_b, 3);
    let intersection = grams_a.intersection(&grams_b).count();
    let union = grams_a.union(&grams_b).count();
    intersection as f64 / union.max(1) as f64
}

/// Whether `text` duplicates anything already seen.
///
/// Unnormalizable (empty) text counts as a duplicate so it gets replaced.
pub fn is_duplicate<'a>(text: &str, seen: impl IntoIterator<Item = &'a String>) -> bool {
    if normalize_text(text).is_empty() {
        return true;
    }
    seen.into_iter().any(|existing| similarity(text, existing) >= DUPLICATE_THRESHOLD)
}

/// Summaries of previously surfaced candidate texts for a stage: current
/// revision first, then history newest-first, capped and de-duplicated.
pub fn collect_avoid_list(task: &Task, stage: StageType) -> Vec<String> {
    let Some(artifact) = task.artifact(stage) else {
        return Vec::new();
    };
    let mut items: Vec<String> = Vec::new();
    for cand in &artifact.candidates {
        let text = summarize(&cand.content_text(stage.key()), SUMMARY_LIMIT);
        if !text.is_empty() {
            items.push(text);
        }
    }
    for snapshot in artifact.history.iter().rev() {
        for cand in &snapshot.candidates {
            let text = summarize(&cand.content_text(stage.key()), SUMMARY_LIMIT);
            if !text.is_empty() {
                items.push(text);
            }
        }
        if items.len() >= MAX_AVOID_ITEMS {
            break;
        }
    }
    let mut deduped = Vec::new();
    for item in items {
        if !deduped.contains(&item) {
            deduped.push(item);
        }
        if deduped.len() >= MAX_AVOID_ITEMS {
            break;
        }
    }
    deduped
}

#[cfg(test)]
#[path = "diversity_tests.rs"]
mod tests;
