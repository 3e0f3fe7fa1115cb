use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::handler::Handler;

/// Maps event keys to the handler that computes their result.
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler under `key`. An existing handler for the same key
    /// is replaced.
    pub fn register(&mut self, key: impl Into<String>, handler: impl Handler + 'static) {
        self.register_arc(key, Arc::new(handler));
    }

    /// Register an already shared handler, e.g. one instance under many keys.
    pub fn register_arc(&mut self, key: impl Into<String>, handler: Arc<dyn Handler>) {
        let key = key.into();
        if self.handlers.insert(key.clone(), handler).is_some() {
            debug!(key = %key, "replaced existing handler");
        }
    }

    /// Look up the handler for `key`. Absence is a normal outcome.
    pub fn lookup(&self, key: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.handlers.contains_key(key)
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
