//! File-content provider: read a file, creating it with placeholder content
//! on first access.

use std::io::ErrorKind;
use std::path::Path;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use evloop_runtime::Handler;

/// Treats the event payload as a path and returns the file's contents.
///
/// Every failure is reported in the returned string.
#[derive(Debug, Clone)]
pub struct FileContentProvider {
    placeholder: String,
}

impl FileContentProvider {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
        }
    }

    pub async fn read_or_create(&self, path: &Path) -> String {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "file missing, creating with placeholder");
                if let Err(e) = self.create(path).await {
                    return format!("Error creating file: {e}");
                }
                match tokio::fs::read_to_string(path).await {
                    Ok(content) => content,
                    Err(e) => format!("Error reading file: {e}"),
                }
            }
            Err(e) => format!("Error reading file: {e}"),
        }
    }

    /// Write the placeholder unless someone else created the file first.
    async fn create(&self, path: &Path) -> std::io::Result<()> {
        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await;
        match file {
            Ok(mut file) => {
                file.write_all(self.placeholder.as_bytes()).await?;
                file.flush().await
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl Default for FileContentProvider {
    fn default() -> Self {
        Self::new("New file created")
    }
}

#[async_trait]
impl Handler for FileContentProvider {
    async fn handle(&self, payload: String) -> String {
        self.read_or_create(Path::new(payload.trim())).await
    }
}
