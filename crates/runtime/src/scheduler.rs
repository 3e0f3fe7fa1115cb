//! The event loop: owns the registry and both queues and advances them one
//! bounded step per [`Scheduler::tick`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use evloop_core::{Event, EventResult, EvloopError, ExecutionMode};

use crate::engine::{Execution, ExecutionEngine};
use crate::handler::Handler;
use crate::queue::{CompletedQueue, PendingQueue};
use crate::registry::HandlerRegistry;
use crate::sink::{OutputSink, StdoutSink};

/// What happened to the event dispatched during a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub key: String,
    pub mode: ExecutionMode,
    pub execution: Execution,
    /// How long `execute` held the driver: about the handler's runtime for
    /// sync events, about zero for async ones.
    pub blocked_for: Duration,
}

/// Summary of a single tick: at most one dispatch and at most one drain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub dispatched: Option<Dispatch>,
    /// Result taken from the completed queue and emitted this tick.
    pub drained: Option<EventResult>,
}

impl TickReport {
    /// True when the tick found both queues empty.
    pub fn is_empty(&self) -> bool {
        self.dispatched.is_none() && self.drained.is_none()
    }

    /// Results handed to the output sink during this tick.
    pub fn delivered(&self) -> usize {
        let inline = matches!(
            self.dispatched,
            Some(Dispatch { execution: Execution::Completed(_), .. })
        );
        usize::from(inline) + usize::from(self.drained.is_some())
    }
}

/// Cooperative single-driver event loop.
///
/// ```ignore
/// let mut scheduler = Scheduler::new();
/// scheduler
///     .register("hello-0", sync_fn(|p| format!("Hello! {p}")))
///     .submit(Event::sync("hello-0", "How are you doing today?"));
/// scheduler.tick().await?;
/// ```
pub struct Scheduler {
    registry: HandlerRegistry,
    pending: PendingQueue,
    completed: CompletedQueue,
    engine: ExecutionEngine,
    sink: Arc<dyn OutputSink>,
}

impl Scheduler {
    /// Create a scheduler that prints results to stdout.
    pub fn new() -> Self {
        let completed = CompletedQueue::new();
        Self {
            registry: HandlerRegistry::new(),
            pending: PendingQueue::new(),
            engine: ExecutionEngine::new(completed.clone()),
            completed,
            sink: Arc::new(StdoutSink),
        }
    }

    /// Replace the output sink.
    pub fn with_sink(mut self, sink: Arc<dyn OutputSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Register `handler` under `key`, replacing any previous one.
    pub fn register(&mut self, key: impl Into<String>, handler: impl Handler + 'static) -> &mut Self {
        self.registry.register(key, handler);
        self
    }

    pub fn register_arc(&mut self, key: impl Into<String>, handler: Arc<dyn Handler>) -> &mut Self {
        self.registry.register_arc(key, handler);
        self
    }

    /// Queue `event` for dispatch on a later tick.
    pub fn submit(&mut self, event: Event) -> &mut Self {
        debug!(key = %event.key(), mode = %event.mode(), "event submitted");
        self.pending.enqueue(event);
        self
    }

    /// Advance the loop by one step.
    ///
    /// 1. Dispatch the oldest pending event, if any. A synchronous handler
    ///    runs to completion here and its result is emitted immediately.
    /// 2. Emit the oldest completed async result, if any.
    ///
    /// Never waits for outstanding async tasks. An `Err` comes only from the
    /// output sink.
    pub async fn tick(&mut self) -> Result<TickReport, EvloopError> {
        let mut report = TickReport::default();

        if let Some(event) = self.pending.dequeue() {
            let key = event.key().to_string();
            let mode = event.mode();
            info!(key = %key, mode = %mode, "received event");

            let started = Instant::now();
            let execution = self.engine.execute(event, &self.registry).await;
            let blocked_for = started.elapsed();

            if execution != Execution::Skipped {
                info!(
                    key = %key,
                    blocked_ms = blocked_for.as_millis() as u64,
                    "event loop was blocked by this operation"
                );
            }
            if let Execution::Completed(result) = &execution {
                self.sink.emit(result)?;
            }

            report.dispatched = Some(Dispatch {
                key,
                mode,
                execution,
                blocked_for,
            });
        }

        if let Some(result) = self.completed.dequeue() {
            self.sink.emit(&result)?;
            report.drained = Some(result);
        }

        Ok(report)
    }

    /// Tick until nothing is pending, completed or in flight, sleeping
    /// `poll_interval` after every tick that found no work. Returns the number
    /// of results delivered.
    ///
    /// Does not return while an async handler is still running.
    pub async fn run_until_idle(&mut self, poll_interval: Duration) -> Result<usize, EvloopError> {
        let mut delivered = 0;
        while !self.is_idle() {
            let report = self.tick().await?;
            delivered += report.delivered();
            if report.is_empty() {
                tokio::time::sleep(poll_interval).await;
            }
        }
        Ok(delivered)
    }

    /// Handle for producers that append to the completed queue.
    pub fn completion_handle(&self) -> CompletedQueue {
        self.completed.clone()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn completed_len(&self) -> usize {
        self.completed.len()
    }

    /// Async tasks spawned but not yet finished.
    pub fn in_flight(&self) -> usize {
        self.engine.in_flight()
    }

    pub fn handler_count(&self) -> usize {
        self.registry.len()
    }

    pub fn is_idle(&self) -> bool {
        // Tasks enqueue their result before leaving the in-flight count.
        self.in_flight() == 0 && self.pending.is_empty() && self.completed.is_empty()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::sync_fn;
    use crate::sink::MemorySink;

    fn scheduler_with_memory() -> (Scheduler, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let scheduler = Scheduler::new().with_sink(sink.clone());
        (scheduler, sink)
    }

    #[tokio::test]
    async fn test_empty_tick_does_nothing() {
        let (mut scheduler, sink) = scheduler_with_memory();
        let report = scheduler.tick().await.unwrap();
        assert!(report.is_empty());
        assert_eq!(report.delivered(), 0);
        assert!(sink.is_empty());
        assert!(scheduler.is_idle());
    }

    #[tokio::test]
    async fn test_register_submit_chain() {
        let (mut scheduler, sink) = scheduler_with_memory();
        scheduler
            .register("hello-0", sync_fn(|p| format!("Hello! {p}")))
            .submit(Event::sync("hello-0", "How are you doing today?"));
        assert_eq!(scheduler.handler_count(), 1);
        assert_eq!(scheduler.pending_len(), 1);

        let report = scheduler.tick().await.unwrap();
        let dispatch = report.dispatched.unwrap();
        assert_eq!(dispatch.key, "hello-0");
        assert_eq!(dispatch.mode, ExecutionMode::Sync);
        assert_eq!(
            sink.results(),
            [EventResult::new("hello-0", "Hello! How are you doing today?")]
        );
    }

    #[tokio::test]
    async fn test_sync_result_bypasses_completed_queue() {
        let (mut scheduler, _sink) = scheduler_with_memory();
        scheduler
            .register("k", sync_fn(|p| p.to_string()))
            .submit(Event::sync("k", "v"));

        let report = scheduler.tick().await.unwrap();
        assert!(report.drained.is_none());
        assert_eq!(report.delivered(), 1);
        assert_eq!(scheduler.completed_len(), 0);
    }

    #[tokio::test]
    async fn test_unregistered_key_is_skipped() {
        let (mut scheduler, sink) = scheduler_with_memory();
        scheduler.submit(Event::sync("nobody-0", "x"));

        let report = scheduler.tick().await.unwrap();
        assert_eq!(report.dispatched.unwrap().execution, Execution::Skipped);
        assert!(sink.is_empty());
        assert!(scheduler.is_idle());
    }

    #[tokio::test]
    async fn test_external_producer_is_drained() {
        let (mut scheduler, sink) = scheduler_with_memory();
        scheduler.completion_handle().enqueue(EventResult::new("ext", "from outside"));

        let report = scheduler.tick().await.unwrap();
        assert!(report.dispatched.is_none());
        assert_eq!(report.drained, Some(EventResult::new("ext", "from outside")));
        assert_eq!(sink.keys(), ["ext"]);
    }

    struct BrokenSink;

    impl OutputSink for BrokenSink {
        fn emit(&self, _result: &EventResult) -> Result<(), EvloopError> {
            Err(EvloopError::Output("broken pipe".into()))
        }
    }

    #[tokio::test]
    async fn test_sink_failure_propagates() {
        let mut scheduler = Scheduler::new().with_sink(Arc::new(BrokenSink));
        scheduler
            .register("k", sync_fn(|p| p.to_string()))
            .submit(Event::sync("k", "v"));

        let err = scheduler.tick().await.unwrap_err();
        assert!(matches!(err, EvloopError::Output(_)));
        // The event was still consumed.
        assert_eq!(scheduler.pending_len(), 0);
    }
}
