//! The two FIFO queues driving the scheduler.
//!
//! [`PendingQueue`] is owned by the single driver. [`CompletedQueue`] is
//! appended to from concurrently running async tasks and drained by the
//! driver, so every access goes through one internal lock.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use evloop_core::{Event, EventResult};

/// Submitted events awaiting dispatch, in submission order.
#[derive(Debug, Default)]
pub struct PendingQueue {
    events: VecDeque<Event>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, event: Event) {
        self.events.push_back(event);
    }

    /// Remove and return the oldest event, or `None` when empty.
    pub fn dequeue(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Results of async executions, in completion order.
///
/// Cloning yields another handle to the same queue.
#[derive(Debug, Clone, Default)]
pub struct CompletedQueue {
    results: Arc<Mutex<VecDeque<EventResult>>>,
}

impl CompletedQueue {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave the deque half-modified,
    // so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, VecDeque<EventResult>> {
        self.results.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn enqueue(&self, result: EventResult) {
        self.lock().push_back(result);
    }

    /// Remove and return the oldest result without waiting.
    pub fn dequeue(&self) -> Option<EventResult> {
        self.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
