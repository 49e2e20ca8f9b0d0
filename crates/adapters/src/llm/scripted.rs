// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted LM client for tests: queued responses with an optional
//! programmable fallback.

use super::{LmClient, LmError, LmRequest};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

type ResponderFn = dyn Fn(&LmRequest) -> Result<String, LmError> + Send + Sync;

/// Deterministic LM stand-in.
///
/// Responses queued with [`push_response`](Self::push_response) are served
/// first, in order; when the queue is empty the fallback responder runs.
/// The default fallback fails, which makes unexpected calls loud.
#[derive(Clone)]
pub struct ScriptedLm {
    queue: Arc<Mutex<VecDeque<Result<String, LmError>>>>,
    fallback: Arc<Mutex<Option<Arc<ResponderFn>>>>,
    calls: Arc<Mutex<Vec<LmRequest>>>,
}

impl Default for ScriptedLm {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedLm {
    pub fn new() -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::new())),
            fallback: Arc::new(Mutex::new(None)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue one successful response.
    pub fn push_response(&self, response: impl Into<String>) {
        self.queue.lock().push_back(Ok(response.into()));
    }

    /// Queue one failure.
    pub fn push_error(&self, error: LmError) {
        self.queue.lock().push_back(Err(error));
    }

    /// Respond from this closure whenever the queue is empty.
    pub fn respond_with<F>(&self, responder: F)
    where
        F: Fn(&LmRequest) -> Result<String, LmError> + Send + Sync + 'static,
    {
        *self.fallback.lock() = Some(Arc::new(responder));
    }

    /// Every request seen so far, in order.
    pub fn calls(&self) -> Vec<LmRequest> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl LmClient for ScriptedLm {
    async fn complete(&self, request: LmRequest) -> Result<String, LmError> {
        self.calls.lock().push(request.clone());
        if let Some(queued) = self.queue.lock().pop_front() {
            return queued;
        }
        let fallback = self.fallback.lock().clone();
        match fallback {
            Some(responder) => responder(&request),
            None => Err(LmError::Invocation("scripted LM exhausted".into())),
        }
    }
}

#[cfg(test)]
#[path = "scripted_tests.rs"]
mod tests;
