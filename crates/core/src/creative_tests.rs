// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn merge_preserves_first_seen_order() {
    let mut ctx = CreativeContext::default();
    ctx.merge_constraints(&["topic:fractions".into(), "grade:G5".into()]);
    ctx.merge_constraints(&["grade:G5".into(), "duration:40".into()]);
    assert_eq!(ctx.key_constraints, vec!["topic:fractions", "grade:G5", "duration:40"]);
}

#[test]
fn merge_skips_blank_items() {
    let mut ctx = CreativeContext::default();
    ctx.merge_anchors(&["  ".into(), "data".into(), "".into()]);
    assert_eq!(ctx.anchor_concepts, vec!["data"]);
}

#[test]
fn working_memory_keeps_last_ten_notes() {
    let mut memory = WorkingMemory::default();
    for i in 0..15 {
        memory.push_note(format!("note {i}"));
    }
    assert_eq!(memory.notes.len(), MAX_WORKING_NOTES);
    assert_eq!(memory.notes.first().map(String::as_str), Some("note 5"));
    assert_eq!(memory.notes.last().map(String::as_str), Some("note 14"));
}

#[test]
fn truncate_is_noop_under_limit() {
    let mut memory = WorkingMemory::default();
    memory.push_note("only");
    memory.truncate();
    assert_eq!(memory.notes, vec!["only"]);
}
