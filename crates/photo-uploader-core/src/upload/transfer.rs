//! Single-shot PUT of a local file to a presigned URL.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use thiserror::Error;
use tracing::debug;

use crate::config::REQUEST_TIMEOUT_SECS;
use crate::utils::format::truncate_body;

const CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("error reading file {}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file upload error")]
    Network(#[from] reqwest::Error),

    #[error("upload failed: status code {status}, response {body}")]
    Rejected { status: u16, body: String },
}

/// Put the whole file at `path` to `url`.
///
/// No chunking, resume or retry; anything but 200 is terminal.
#[async_trait]
pub trait TransferExecutor: Send + Sync {
    async fn put_file(&self, url: &str, path: &Path) -> Result<(), TransferError>;
}

/// Clone is cheap - reqwest::Client uses Arc internally.
#[derive(Clone)]
pub struct HttpTransfer {
    client: Client,
}

impl HttpTransfer {
    pub fn new() -> Result<Self, TransferError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl TransferExecutor for HttpTransfer {
    async fn put_file(&self, url: &str, path: &Path) -> Result<(), TransferError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| TransferError::ReadFile {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(path = %path.display(), size = bytes.len(), "Uploading file");
        let response = self
            .client
            .put(url)
            .header(header::CONTENT_TYPE, CONTENT_TYPE)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(TransferError::Rejected {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        debug!(status = status.as_u16(), "Upload accepted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{body_bytes, header as header_eq, method, path as path_eq, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn test_put_sends_file_bytes() {
        let dir = TempDir::new().unwrap();
        let contents = b"\xff\xd8\xff\xe0 fake jpeg bytes";
        let file = write_file(&dir, "photo.jpg", contents);

        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path_eq("/bucket/photo.jpg"))
            .and(query_param("X-Amz-Signature", "abc"))
            .and(header_eq("content-type", CONTENT_TYPE))
            .and(body_bytes(contents.to_vec()))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/bucket/photo.jpg?X-Amz-Signature=abc", server.uri());
        HttpTransfer::new().unwrap().put_file(&url, &file).await.unwrap();
    }

    #[tokio::test]
    async fn test_error_status_is_rejected() {
        let dir = TempDir::new().unwrap();
        let file = write_file(&dir, "photo.jpg", b"data");

        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(403).set_body_string("<Error>SignatureDoesNotMatch</Error>"))
            .mount(&server)
            .await;

        let err = HttpTransfer::new()
            .unwrap()
            .put_file(&server.uri(), &file)
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::Rejected { status: 403, .. }));
        assert!(err.to_string().contains("SignatureDoesNotMatch"));
    }

    #[tokio::test]
    async fn test_no_content_is_not_accepted() {
        let dir = TempDir::new().unwrap();
        let file = write_file(&dir, "photo.jpg", b"data");

        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let err = HttpTransfer::new()
            .unwrap()
            .put_file(&server.uri(), &file)
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::Rejected { status: 204, .. }));
    }

    #[tokio::test]
    async fn test_missing_file_is_read_error() {
        let dir = TempDir::new().unwrap();
        let err = HttpTransfer::new()
            .unwrap()
            .put_file("http://127.0.0.1:1/", &dir.path().join("missing.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::ReadFile { .. }));
    }
}
