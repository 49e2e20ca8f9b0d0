// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory chat sessions used by the entry resolver.

use parking_lot::RwLock;
use pbl_core::SessionId;
use std::collections::HashMap;

/// Messages from one chat surface, oldest first.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    pub session_id: SessionId,
    pub messages: Vec<(String, String)>,
    /// Last intent-bearing user utterance, for divergence checks.
    pub last_intent: Option<String>,
}

impl ChatSession {
    pub fn append(&mut self, role: impl Into<String>, content: impl Into<String>) {
        self.messages.push((role.into(), content.into()));
    }

    /// The most recent `n` messages rendered as a transcript block.
    pub fn transcript_tail(&self, n: usize) -> String {
        let start = self.messages.len().saturating_sub(n);
        self.messages[start..]
            .iter()
            .map(|(role, content)| format!("{role}: {content}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Session index keyed by session id.
#[derive(Default)]
pub struct ChatSessionStore {
    sessions: RwLock<HashMap<SessionId, ChatSession>>,
}

impl ChatSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing session, or a new one when the id is unknown or absent.
    pub fn get_or_create(&self, session_id: Option<&str>) -> ChatSession {
        if let Some(id) = session_id {
            if let Some(session) = self.sessions.read().get(id) {
                return session.clone();
            }
        }
        let session = ChatSession { session_id: SessionId::new(), ..ChatSession::default() };
        self.sessions.write().insert(session.session_id, session.clone());
        session
    }

    pub fn save(&self, session: ChatSession) {
        self.sessions.write().insert(session.session_id, session);
    }
}
