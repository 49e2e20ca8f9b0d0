// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario realism gate: a configurable blocklist of fantastical terms.

/// The first blocklisted term found in `text`, case-insensitively.
pub fn find_unrealistic_term<'a>(
    text: &str,
    blocklist: impl IntoIterator<Item = &'a str>,
) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    let lowered = text.to_lowercase();
    blocklist
        .into_iter()
        .find(|term| !term.is_empty() && lowered.contains(&term.to_lowercase()))
        .map(str::to_string)
}

/// Whether `text` passes the realism gate.
pub fn is_realistic<'a>(text: &str, blocklist: impl IntoIterator<Item = &'a str>) -> bool {
    find_unrealistic_term(text, blocklist).is_none()
}
