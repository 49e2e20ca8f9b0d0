// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chat entry resolution: classify the user's opening utterance into a
//! scenario or tool-seed task start.

mod resolver;
mod rules;
mod session;

pub use resolver::{ChatResolution, EntryResolver};
pub use rules::{apply_keyword_rules, apply_strong_signals, has_entry_keywords, RuleOutcome};
pub use session::{ChatSession, ChatSessionStore};
