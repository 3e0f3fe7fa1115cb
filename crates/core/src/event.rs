//! Events submitted to the scheduler and the results they produce.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;

/// How an event's handler is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Inline on the driver; blocks it for the handler's full duration.
    Sync,
    /// On an independent task; the result arrives later via the completed queue.
    Async,
}

impl ExecutionMode {
    /// Parse a menu choice: `"1"` is synchronous, `"2"` asynchronous.
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(Self::Sync),
            "2" => Some(Self::Async),
            _ => None,
        }
    }

    pub fn is_async(self) -> bool {
        matches!(self, Self::Async)
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync => f.write_str("sync"),
            Self::Async => f.write_str("async"),
        }
    }
}

/// Optional bounds on an asynchronous dispatch. None are set by default, in
/// which case the spawned task runs until its handler returns.
#[derive(Debug, Clone, Default)]
pub struct DispatchOptions {
    pub deadline: Option<Duration>,
    pub cancel: Option<CancelToken>,
}

impl DispatchOptions {
    pub fn is_unbounded(&self) -> bool {
        self.deadline.is_none() && self.cancel.is_none()
    }
}

/// A unit of submitted work: which handler, what payload, and how to run it.
///
/// Immutable once built; the scheduler consumes it exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    key: String,
    payload: String,
    mode: ExecutionMode,
    #[serde(skip)]
    options: DispatchOptions,
}

impl Event {
    pub fn new(key: impl Into<String>, payload: impl Into<String>, mode: ExecutionMode) -> Self {
        Self {
            key: key.into(),
            payload: payload.into(),
            mode,
            options: DispatchOptions::default(),
        }
    }

    pub fn sync(key: impl Into<String>, payload: impl Into<String>) -> Self {
        Self::new(key, payload, ExecutionMode::Sync)
    }

    pub fn asynchronous(key: impl Into<String>, payload: impl Into<String>) -> Self {
        Self::new(key, payload, ExecutionMode::Async)
    }

    /// Abandon the async task if the handler has not returned within `deadline`.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.options.deadline = Some(deadline);
        self
    }

    /// Abandon the async task once `token` is cancelled.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.options.cancel = Some(token);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn options(&self) -> &DispatchOptions {
        &self.options
    }

    /// Split the event into its key, payload and dispatch options.
    pub fn into_parts(self) -> (String, String, DispatchOptions) {
        (self.key, self.payload, self.options)
    }
}

/// The output of exactly one handler execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventResult {
    pub key: String,
    pub result: String,
}

impl EventResult {
    pub fn new(key: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            result: result.into(),
        }
    }
}

impl fmt::Display for EventResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Output for Event {:?}: {}", self.key, self.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_choice() {
        assert_eq!(ExecutionMode::from_choice("1"), Some(ExecutionMode::Sync));
        assert_eq!(ExecutionMode::from_choice(" 2\n"), Some(ExecutionMode::Async));
        assert_eq!(ExecutionMode::from_choice("3"), None);
        assert_eq!(ExecutionMode::from_choice(""), None);
    }

    #[test]
    fn test_mode_serializes_lowercase() {
        let json = serde_json::to_string(&ExecutionMode::Async).unwrap();
        assert_eq!(json, "\"async\"");
    }

    #[test]
    fn test_event_defaults_to_unbounded() {
        let event = Event::asynchronous("hello-0", "hi");
        assert_eq!(event.key(), "hello-0");
        assert_eq!(event.payload(), "hi");
        assert!(event.mode().is_async());
        assert!(event.options().is_unbounded());
    }

    #[test]
    fn test_event_builder_sets_options() {
        let token = CancelToken::new();
        let event = Event::asynchronous("k", "p")
            .with_deadline(Duration::from_secs(3))
            .with_cancel(token.clone());
        assert_eq!(event.options().deadline, Some(Duration::from_secs(3)));
        assert!(!event.options().is_unbounded());

        token.cancel();
        assert!(event.options().cancel.as_ref().unwrap().is_cancelled());
    }

    #[test]
    fn test_event_options_not_serialized() {
        let event = Event::sync("read-file-1", "hello.txt").with_deadline(Duration::from_secs(1));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"key": "read-file-1", "payload": "hello.txt", "mode": "sync"})
        );

        let back: Event = serde_json::from_value(json).unwrap();
        assert!(back.options().is_unbounded());
    }

    #[test]
    fn test_result_display() {
        let result = EventResult::new("hello-0", "Hello! there");
        assert_eq!(result.to_string(), "Output for Event \"hello-0\": Hello! there");
    }
}
