// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-task event fan-out with bounded per-subscriber queues.
//!
//! Publication never blocks the mutation path: events go out with
//! `try_send`, and a subscriber whose queue is full loses the event (the
//! JSON event log stays authoritative). Subscribers joined after an event
//! never see it; historic replay is the client's job.

use parking_lot::Mutex;
use pbl_core::{Event, TaskId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Queue depth per subscriber.
const SUBSCRIBER_QUEUE_CAPACITY: usize = 256;

struct Subscriber {
    id: u64,
    tx: mpsc::Sender<Event>,
}

#[derive(Default)]
struct BusState {
    subscribers: HashMap<TaskId, Vec<Subscriber>>,
}

/// Fan-out hub shared by the orchestrator and transport code.
pub struct EventBus {
    state: Mutex<BusState>,
    next_id: AtomicU64,
    dropped_warned: AtomicBool,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BusState::default()),
            next_id: AtomicU64::new(1),
            dropped_warned: AtomicBool::new(false),
        }
    }

    /// Subscribe to every future event of a task.
    pub fn subscribe(self: &Arc<Self>, task_id: TaskId) -> Subscription {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_QUEUE_CAPACITY);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.state
            .lock()
            .subscribers
            .entry(task_id)
            .or_default()
            .push(Subscriber { id, tx });
        Subscription { bus: Arc::clone(self), task_id, id, rx }
    }

    /// Deliver an event to every live subscriber of its task.
    ///
    /// Slow subscribers drop events rather than stalling the writer; the
    /// first drop is logged once per process.
    pub fn publish(&self, event: &Event) {
        let mut state = self.state.lock();
        let Some(subscribers) = state.subscribers.get_mut(&event.task_id) else {
            return;
        };
        subscribers.retain(|subscriber| match subscriber.tx.try_send(event.clone()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                if !self.dropped_warned.swap(true, Ordering::Relaxed) {
                    tracing::warn!(
                        task_id = %event.task_id,
                        event = event.kind(),
                        "subscriber queue full; dropping event (log remains authoritative)"
                    );
                }
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });
        if subscribers.is_empty() {
            state.subscribers.remove(&event.task_id);
        }
    }

    pub fn subscriber_count(&self, task_id: &TaskId) -> usize {
        self.state.lock().subscribers.get(task_id).map(Vec::len).unwrap_or(0)
    }

    fn unsubscribe(&self, task_id: &TaskId, id: u64) {
        let mut state = self.state.lock();
        if let Some(subscribers) = state.subscribers.get_mut(task_id) {
            subscribers.retain(|s| s.id != id);
            if subscribers.is_empty() {
                state.subscribers.remove(task_id);
            }
        }
    }
}

/// One subscriber's receive handle; unlinks its queue on drop.
pub struct Subscription {
    bus: Arc<EventBus>,
    task_id: TaskId,
    id: u64,
    rx: mpsc::Receiver<Event>,
}

impl Subscription {
    /// Await the next event; `None` once the bus side is gone.
    pub async fn recv(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Non-blocking poll for the next event.
    pub fn try_recv(&mut self) -> Option<Event> {
        self.rx.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(&self.task_id, self.id);
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
