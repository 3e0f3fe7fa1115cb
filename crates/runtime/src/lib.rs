pub mod engine;
pub mod handler;
pub mod queue;
pub mod registry;
pub mod scheduler;
pub mod sink;

pub use engine::{Execution, ExecutionEngine};
pub use handler::{blocking_fn, handler_fn, sync_fn, Handler};
pub use queue::{CompletedQueue, PendingQueue};
pub use registry::HandlerRegistry;
pub use scheduler::{Dispatch, Scheduler, TickReport};
pub use sink::{MemorySink, OutputSink, StdoutSink, TracingSink};

pub use evloop_core::{CancelToken, Event, EventResult, EvloopError, ExecutionMode};
