//! The handler trait and adapters for turning closures into handlers.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;

/// Computes a result string from an event payload.
///
/// Handlers never fail: any error is described inside the returned string.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, payload: String) -> String;
}

#[async_trait]
impl<T: Handler + ?Sized> Handler for Arc<T> {
    async fn handle(&self, payload: String) -> String {
        (**self).handle(payload).await
    }
}

// ── Async closures ───────────────────────────────────────────────────

/// Handler backed by a closure returning a future.
pub struct FnHandler {
    f: Box<dyn Fn(String) -> BoxFuture<'static, String> + Send + Sync>,
}

/// Wrap an async closure as a [`Handler`].
///
/// ```ignore
/// scheduler.register("wait", handler_fn(|payload| async move {
///     tokio::time::sleep(Duration::from_millis(50)).await;
///     payload
/// }));
/// ```
pub fn handler_fn<F, Fut>(f: F) -> FnHandler
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = String> + Send + 'static,
{
    FnHandler {
        f: Box::new(move |payload| f(payload).boxed()),
    }
}

#[async_trait]
impl Handler for FnHandler {
    async fn handle(&self, payload: String) -> String {
        (self.f)(payload).await
    }
}

// ── Plain closures ───────────────────────────────────────────────────

/// Handler backed by a cheap, non-blocking closure, run in place.
pub struct SyncFnHandler<F> {
    f: F,
}

pub fn sync_fn<F>(f: F) -> SyncFnHandler<F>
where
    F: Fn(&str) -> String + Send + Sync + 'static,
{
    SyncFnHandler { f }
}

#[async_trait]
impl<F> Handler for SyncFnHandler<F>
where
    F: Fn(&str) -> String + Send + Sync + 'static,
{
    async fn handle(&self, payload: String) -> String {
        (self.f)(&payload)
    }
}

// ── Blocking closures ────────────────────────────────────────────────

/// Handler backed by a closure that may block the calling thread
/// (std I/O, `thread::sleep`, CPU-heavy work). Runs on tokio's blocking pool.
pub struct BlockingFnHandler<F> {
    f: Arc<F>,
}

pub fn blocking_fn<F>(f: F) -> BlockingFnHandler<F>
where
    F: Fn(String) -> String + Send + Sync + 'static,
{
    BlockingFnHandler { f: Arc::new(f) }
}

#[async_trait]
impl<F> Handler for BlockingFnHandler<F>
where
    F: Fn(String) -> String + Send + Sync + 'static,
{
    async fn handle(&self, payload: String) -> String {
        let f = self.f.clone();
        match tokio::task::spawn_blocking(move || f(payload)).await {
            Ok(result) => result,
            Err(e) => format!("Error running handler: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_handler_fn() {
        let h = handler_fn(|p| async move { format!("Hello! {p}") });
        assert_eq!(h.handle("there".into()).await, "Hello! there");
    }

    #[tokio::test]
    async fn test_sync_fn() {
        let h = sync_fn(|p| p.to_uppercase());
        assert_eq!(h.handle("abc".into()).await, "ABC");
    }

    #[tokio::test]
    async fn test_blocking_fn() {
        let h = blocking_fn(|p| {
            std::thread::sleep(std::time::Duration::from_millis(5));
            p.len().to_string()
        });
        assert_eq!(h.handle("four".into()).await, "4");
    }

    #[tokio::test]
    async fn test_blocking_fn_panic_is_encoded() {
        let h = blocking_fn(|_| panic!("boom"));
        let result = h.handle(String::new()).await;
        assert!(result.starts_with("Error running handler"), "{result}");
    }

    #[tokio::test]
    async fn test_arc_dyn_handler() {
        let h: Arc<dyn Handler> = Arc::new(sync_fn(|p| p.chars().rev().collect()));
        assert_eq!(h.handle("abc".into()).await, "cba");
    }
}
