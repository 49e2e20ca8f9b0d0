// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dialogue and intent tracking alongside stage work.

mod creative;
mod divergence;
mod router;

pub use creative::{CreativeDialogueManager, IntentExtraction, INTENT_EDIT_PATTERN};
pub use divergence::{divergence_score, DivergenceDetector};
pub use router::InteractionRouter;
