//! Unique event keys.

use std::sync::atomic::{AtomicU64, Ordering};

/// Build the key for the `counter`-th event of a run: `"{base}-{counter}"`.
pub fn event_key(base: &str, counter: u64) -> String {
    format!("{base}-{counter}")
}

/// A run-wide counter shared by every key base, so `hello-0` and
/// `read-file-1` never collide on the numeric suffix either.
#[derive(Debug, Default)]
pub struct KeySequence {
    next: AtomicU64,
}

impl KeySequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the next key for `base` and advance the counter.
    pub fn next_key(&self, base: &str) -> String {
        let counter = self.next.fetch_add(1, Ordering::Relaxed);
        event_key(base, counter)
    }

    /// Number of keys handed out so far.
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_event_key_format() {
        assert_eq!(event_key("hello", 0), "hello-0");
        assert_eq!(event_key("fetch-from-api", 12), "fetch-from-api-12");
    }

    #[test]
    fn test_sequence_starts_at_zero() {
        let keys = KeySequence::new();
        assert_eq!(keys.next_key("hello"), "hello-0");
        assert_eq!(keys.next_key("read-file"), "read-file-1");
        assert_eq!(keys.issued(), 2);
    }

    #[test]
    fn test_same_base_never_repeats() {
        let keys = KeySequence::new();
        let generated: HashSet<String> = (0..1000).map(|_| keys.next_key("hello")).collect();
        assert_eq!(generated.len(), 1000);
    }
}
