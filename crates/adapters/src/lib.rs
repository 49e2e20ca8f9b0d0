// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! External adapters: the language-model client and the trace manager.
//!
//! The core never talks to the network directly; it goes through the
//! [`LmClient`] seam so tests can substitute a scripted client.

pub mod llm;
pub mod trace;

pub use llm::{LmClient, LmConfig, LmError, LmRequest, OpenAiClient, UnconfiguredLm};
#[cfg(any(test, feature = "test-support"))]
pub use llm::ScriptedLm;
pub use trace::{ChildSpan, TraceManager};
