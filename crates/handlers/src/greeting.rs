use evloop_runtime::{sync_fn, Handler};

pub fn greet(payload: &str) -> String {
    format!("Hello! {payload}")
}

/// Handler answering every payload with a greeting.
pub fn greeting() -> impl Handler {
    sync_fn(greet)
}
