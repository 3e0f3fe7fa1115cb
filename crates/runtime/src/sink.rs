//! Output sinks: where delivered results end up.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use tracing::info;

use evloop_core::{EventResult, EvloopError};

/// Renders one delivered result.
///
/// A sink error is fatal to the driver; the scheduler never retries it.
pub trait OutputSink: Send + Sync {
    fn emit(&self, result: &EventResult) -> Result<(), EvloopError>;
}

/// Writes `Output for Event "<key>": <result>` lines to stdout.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn emit(&self, result: &EventResult) -> Result<(), EvloopError> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{result}\n")
            .and_then(|_| stdout.flush())
            .map_err(|e| EvloopError::Output(format!("stdout: {e}")))
    }
}

/// Logs each result at info level.
#[derive(Debug, Default)]
pub struct TracingSink;

impl OutputSink for TracingSink {
    fn emit(&self, result: &EventResult) -> Result<(), EvloopError> {
        info!(key = %result.key, result = %result.result, "event output");
        Ok(())
    }
}

/// Collects results in delivery order.
#[derive(Debug, Default)]
pub struct MemorySink {
    results: Mutex<Vec<EventResult>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn results(&self) -> Vec<EventResult> {
        self.results.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn keys(&self) -> Vec<String> {
        self.results().into_iter().map(|r| r.key).collect()
    }

    pub fn len(&self) -> usize {
        self.results.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OutputSink for MemorySink {
    fn emit(&self, result: &EventResult) -> Result<(), EvloopError> {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(result.clone());
        Ok(())
    }
}

impl<T: OutputSink + ?Sized> OutputSink for std::sync::Arc<T> {
    fn emit(&self, result: &EventResult) -> Result<(), EvloopError> {
        (**self).emit(result)
    }
}
