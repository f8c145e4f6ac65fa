//! Authorize-then-transfer for one object.

use std::path::{Path, PathBuf};

use reqwest::Url;
use thiserror::Error;
use tracing::{debug, info};

use super::{TransferError, TransferExecutor};
use crate::api::{ApiError, UploadAuthorizer};
use crate::config::CredentialRecord;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("object key must not be empty")]
    EmptyKey,

    #[error("cannot upload {}: {reason}", .path.display())]
    LocalFile { path: PathBuf, reason: String },

    #[error("failed to get pre-signed URL")]
    Authorize(#[from] ApiError),

    #[error("failed to upload file")]
    Transfer(#[from] TransferError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub presigned_url: String,
    /// Where the uploaded object can be fetched from.
    pub access_url: String,
}

/// Upload `file` under `key` using the record's (already valid) token.
///
/// The transfer executor only runs after authorization succeeded.
pub async fn upload_file<Z, T>(
    record: &CredentialRecord,
    authorizer: &Z,
    transfer: &T,
    file: &Path,
    key: &str,
) -> Result<UploadOutcome, UploadError>
where
    Z: UploadAuthorizer + ?Sized,
    T: TransferExecutor + ?Sized,
{
    if key.trim().is_empty() {
        return Err(UploadError::EmptyKey);
    }
    check_local_file(file).await?;

    let presigned_url = authorizer
        .request_upload_url(&record.api_endpoint, &record.id_token, key)
        .await?;
    debug!(url = %presigned_url, "Obtained presigned URL");

    transfer.put_file(&presigned_url, file).await?;

    let access_url = access_url(record.cloudfront_domain.as_deref(), &presigned_url, key);
    info!(key, access_url = %access_url, "Upload complete");
    Ok(UploadOutcome {
        presigned_url,
        access_url,
    })
}

async fn check_local_file(file: &Path) -> Result<(), UploadError> {
    let metadata = tokio::fs::metadata(file)
        .await
        .map_err(|e| UploadError::LocalFile {
            path: file.to_path_buf(),
            reason: e.to_string(),
        })?;
    if !metadata.is_file() {
        return Err(UploadError::LocalFile {
            path: file.to_path_buf(),
            reason: "not a regular file".to_string(),
        });
    }
    Ok(())
}

/// Public URL for an uploaded object.
///
/// With a distribution domain this is `https://<domain>/<key>`; otherwise it
/// is the presigned URL without its signing query.
pub fn access_url(distribution_domain: Option<&str>, presigned_url: &str, key: &str) -> String {
    let domain = distribution_domain
        .map(str::trim)
        .filter(|d| !d.is_empty());

    if let Some(domain) = domain {
        let base = if domain.contains("://") {
            domain.to_string()
        } else {
            format!("https://{}", domain)
        };
        return format!(
            "{}/{}",
            base.trim_end_matches('/'),
            key.trim_start_matches('/')
        );
    }

    match Url::parse(presigned_url) {
        Ok(mut url) => {
            url.set_query(None);
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => presigned_url
            .split('?')
            .next()
            .unwrap_or(presigned_url)
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_url_with_distribution_domain() {
        let presigned = "https://bucket.s3.amazonaws.com/photo.jpg?sig=abc";
        assert_eq!(
            access_url(Some("abcdef.cloudfront.net"), presigned, "photo.jpg"),
            "https://abcdef.cloudfront.net/photo.jpg"
        );
        assert_eq!(
            access_url(Some("https://cdn.example.com/"), presigned, "/2024/photo.jpg"),
            "https://cdn.example.com/2024/photo.jpg"
        );
    }

    #[test]
    fn test_access_url_without_domain_strips_signature() {
        assert_eq!(
            access_url(None, "https://bucket.s3.amazonaws.com/photo.jpg?sig=abc", "photo.jpg"),
            "https://bucket.s3.amazonaws.com/photo.jpg"
        );
        assert_eq!(
            access_url(Some("  "), "https://bucket.s3.amazonaws.com/a.jpg?x=1", "a.jpg"),
            "https://bucket.s3.amazonaws.com/a.jpg"
        );
    }
}
