//! Runs one event's handler, either inline or on a spawned task.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use evloop_core::{CancelToken, DispatchOptions, Event, EventResult, ExecutionMode};

use crate::handler::Handler;
use crate::queue::CompletedQueue;
use crate::registry::HandlerRegistry;

/// Outcome of [`ExecutionEngine::execute`] as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Execution {
    /// Synchronous run finished; the result goes straight to output.
    Completed(EventResult),
    /// Asynchronous run spawned; its result will appear on the completed queue.
    Deferred,
    /// No handler was registered for the key. Terminal, not an error.
    Skipped,
}

/// Why a spawned task stopped without producing a result.
enum Abandoned {
    Deadline(Duration),
    Cancelled,
}

/// Executes events against a [`HandlerRegistry`] and feeds async results
/// into a shared [`CompletedQueue`].
pub struct ExecutionEngine {
    completed: CompletedQueue,
    in_flight: Arc<AtomicUsize>,
}

impl ExecutionEngine {
    pub fn new(completed: CompletedQueue) -> Self {
        Self {
            completed,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of spawned tasks that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Run `event`. Synchronous events are awaited to completion here; async
    /// events are spawned onto the current tokio runtime and return at once.
    pub async fn execute(&self, event: Event, registry: &HandlerRegistry) -> Execution {
        let Some(handler) = registry.lookup(event.key()) else {
            info!(key = %event.key(), "no handler found");
            return Execution::Skipped;
        };

        let mode = event.mode();
        let (key, payload, options) = event.into_parts();
        match mode {
            ExecutionMode::Sync => {
                if !options.is_unbounded() {
                    debug!(key = %key, "dispatch options ignored for synchronous event");
                }
                let result = handler.handle(payload).await;
                Execution::Completed(EventResult { key, result })
            }
            ExecutionMode::Async => {
                self.spawn(key, payload, options, handler);
                Execution::Deferred
            }
        }
    }

    fn spawn(&self, key: String, payload: String, options: DispatchOptions, handler: Arc<dyn Handler>) {
        let completed = self.completed.clone();
        let guard = InFlightGuard::enter(self.in_flight.clone());

        tokio::spawn(async move {
            let _guard = guard;
            match run_bounded(handler, payload, options).await {
                Ok(result) => {
                    debug!(key = %key, "async handler completed");
                    completed.enqueue(EventResult { key, result });
                }
                Err(Abandoned::Deadline(limit)) => {
                    warn!(key = %key, deadline = ?limit, "async handler exceeded its deadline, abandoned");
                }
                Err(Abandoned::Cancelled) => {
                    warn!(key = %key, "async handler cancelled");
                }
            }
        });
    }
}

async fn run_bounded(
    handler: Arc<dyn Handler>,
    payload: String,
    options: DispatchOptions,
) -> Result<String, Abandoned> {
    let DispatchOptions { deadline, cancel } = options;
    let work = async move {
        match deadline {
            Some(limit) => tokio::time::timeout(limit, handler.handle(payload))
                .await
                .map_err(|_| Abandoned::Deadline(limit)),
            None => Ok(handler.handle(payload).await),
        }
    };

    match cancel {
        Some(token) => race_cancel(work, token).await,
        None => work.await,
    }
}

async fn race_cancel(
    work: impl std::future::Future<Output = Result<String, Abandoned>>,
    token: CancelToken,
) -> Result<String, Abandoned> {
    tokio::select! {
        outcome = work => outcome,
        _ = token.cancelled() => Err(Abandoned::Cancelled),
    }
}

/// Keeps the in-flight count accurate even when a task panics or is aborted.
struct InFlightGuard(Arc<AtomicUsize>);

impl InFlightGuard {
    fn enter(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
