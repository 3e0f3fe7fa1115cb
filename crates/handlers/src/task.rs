//! The menu of built-in tasks and how each becomes a registered handler
//! plus a submitted event.

use std::fmt;
use std::sync::Arc;

use evloop_core::{Event, ExecutionMode, HandlerConfig, KeySequence};
use evloop_runtime::{Handler, Scheduler};

use crate::fetch::RecordFetcher;
use crate::file::FileContentProvider;
use crate::greeting::greeting;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Greet,
    ReadFile,
    FetchRecord,
}

impl Task {
    pub const ALL: [Task; 3] = [Task::Greet, Task::ReadFile, Task::FetchRecord];

    /// Parse a menu choice (`"1"`..`"3"`).
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(Self::Greet),
            "2" => Some(Self::ReadFile),
            "3" => Some(Self::FetchRecord),
            _ => None,
        }
    }

    /// Prefix of the generated event key.
    pub fn key_base(self) -> &'static str {
        match self {
            Self::Greet => "hello",
            Self::ReadFile => "read-file",
            Self::FetchRecord => "fetch-from-api",
        }
    }

    pub fn payload(self, config: &HandlerConfig) -> String {
        match self {
            Self::Greet => config.greeting.clone(),
            Self::ReadFile => config.file_path.display().to_string(),
            Self::FetchRecord => config.fetch_record_id.clone(),
        }
    }

    pub fn handler(self, config: &HandlerConfig) -> Arc<dyn Handler> {
        match self {
            Self::Greet => Arc::new(greeting()),
            Self::ReadFile => Arc::new(FileContentProvider::new(config.placeholder.clone())),
            Self::FetchRecord => Arc::new(RecordFetcher::new(config.fetch_base_url.clone())),
        }
    }

    /// Register this task's handler under a fresh key and queue its event.
    /// Returns the generated key.
    pub fn submit(
        self,
        scheduler: &mut Scheduler,
        keys: &KeySequence,
        mode: ExecutionMode,
        config: &HandlerConfig,
    ) -> String {
        let key = keys.next_key(self.key_base());
        scheduler
            .register_arc(key.clone(), self.handler(config))
            .submit(Event::new(key.clone(), self.payload(config), mode));
        key
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Greet => f.write_str("Wish me Hello"),
            Self::ReadFile => f.write_str("Print the contents of a file"),
            Self::FetchRecord => f.write_str("Retrieve data from API & print it"),
        }
    }
}
