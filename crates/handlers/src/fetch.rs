//! Remote-record fetcher backed by a JSON posts API.

use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use evloop_runtime::Handler;

/// Default API serving `/posts/{id}`.
pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// A post record as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Post {
    pub id: u64,
    #[serde(rename = "userId")]
    pub user_id: u64,
    pub title: String,
    pub body: String,
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id={} user_id={} title={:?} body={:?}",
            self.id, self.user_id, self.title, self.body
        )
    }
}

/// Treats the event payload as a post id and describes the fetched record.
///
/// Network and decoding failures are reported in the returned string.
#[derive(Debug, Clone)]
pub struct RecordFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl RecordFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Use a preconfigured client (timeouts, proxies, ...).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn url_for(&self, id: &str) -> String {
        format!("{}/posts/{}", self.base_url.trim_end_matches('/'), id.trim())
    }

    pub async fn fetch(&self, id: &str) -> String {
        let url = self.url_for(id);
        debug!(url = %url, "fetching record");

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => return format!("Error fetching data from API: {e}"),
        };

        let status = response.status();
        if !status.is_success() {
            return format!("Error fetching data from API: HTTP {status}");
        }

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return format!("Error fetching data from API: {e}"),
        };

        match serde_json::from_slice::<Post>(&bytes) {
            Ok(post) => format!("Fetched post from API: {post}"),
            Err(e) => format!("Error decoding data from API: {e}"),
        }
    }
}

impl Default for RecordFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl Handler for RecordFetcher {
    async fn handle(&self, payload: String) -> String {
        self.fetch(&payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve a single canned HTTP response on a random local port and return
    /// the base URL.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });
        format!("http://{addr}")
    }

    fn local_fetcher(base: String) -> RecordFetcher {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        RecordFetcher::with_client(client, base)
    }

    #[test]
    fn test_url_for() {
        let fetcher = RecordFetcher::new("http://api.local/");
        assert_eq!(fetcher.url_for(" 2\n"), "http://api.local/posts/2");
    }

    #[test]
    fn test_post_deserialize() {
        let post: Post =
            serde_json::from_str(r#"{"userId":1,"id":2,"title":"qui est esse","body":"est rerum"}"#)
                .unwrap();
        assert_eq!(post.user_id, 1);
        assert_eq!(post.id, 2);
        assert_eq!(
            post.to_string(),
            r#"id=2 user_id=1 title="qui est esse" body="est rerum""#
        );
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let base = serve_once("200 OK", r#"{"userId":1,"id":2,"title":"t","body":"b"}"#).await;
        let result = local_fetcher(base).handle("2".into()).await;
        assert_eq!(result, r#"Fetched post from API: id=2 user_id=1 title="t" body="b""#);
    }

    #[tokio::test]
    async fn test_fetch_not_found() {
        let base = serve_once("404 Not Found", "{}").await;
        let result = local_fetcher(base).fetch("999").await;
        assert_eq!(result, "Error fetching data from API: HTTP 404 Not Found");
    }

    #[tokio::test]
    async fn test_fetch_bad_json() {
        let base = serve_once("200 OK", r#"{"unexpected":true}"#).await;
        let result = local_fetcher(base).fetch("2").await;
        assert!(result.starts_with("Error decoding data from API:"), "{result}");
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        // Bind then drop to get a port nothing listens on.
        let addr = TcpListener::bind("127.0.0.1:0").await.unwrap().local_addr().unwrap();
        let result = local_fetcher(format!("http://{addr}")).fetch("2").await;
        assert!(result.starts_with("Error fetching data from API:"), "{result}");
    }
}
