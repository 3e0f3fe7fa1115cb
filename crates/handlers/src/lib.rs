//! Handler bodies for the tasks the interactive driver offers: a greeting,
//! a file-content provider and a remote-record fetcher.

pub mod fetch;
pub mod file;
pub mod greeting;
pub mod task;

pub use fetch::{Post, RecordFetcher};
pub use file::FileContentProvider;
pub use greeting::{greet, greeting};
pub use task::Task;
