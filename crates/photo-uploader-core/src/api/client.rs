//! Presign API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use super::ApiError;
use crate::config::REQUEST_TIMEOUT_SECS;

/// Exchange a bearer token and object key for a short-lived upload URL.
///
/// Failures are returned as-is; nothing here retries.
#[async_trait]
pub trait UploadAuthorizer: Send + Sync {
    async fn request_upload_url(
        &self,
        api_endpoint: &str,
        id_token: &str,
        key: &str,
    ) -> Result<String, ApiError>;
}

#[derive(Debug, Deserialize)]
struct PresignedUrlResponse {
    url: String,
}

/// API client for the presign endpoint.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    expiration_secs: Option<u64>,
}

impl ApiClient {
    pub fn new() -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            expiration_secs: None,
        })
    }

    /// Ask the API for URLs valid for `secs` seconds instead of its default.
    pub fn with_expiration(mut self, secs: u64) -> Self {
        self.expiration_secs = Some(secs);
        self
    }

    fn parse_endpoint(api_endpoint: &str) -> Result<Url, ApiError> {
        let url = Url::parse(api_endpoint.trim()).map_err(|e| ApiError::InvalidEndpoint {
            endpoint: api_endpoint.to_string(),
            reason: e.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ApiError::InvalidEndpoint {
                endpoint: api_endpoint.to_string(),
                reason: format!("unsupported scheme {:?}", other),
            }),
        }
    }

    /// Check the response is a 200, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status() == StatusCode::OK {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }
}

#[async_trait]
impl UploadAuthorizer for ApiClient {
    async fn request_upload_url(
        &self,
        api_endpoint: &str,
        id_token: &str,
        key: &str,
    ) -> Result<String, ApiError> {
        let url = Self::parse_endpoint(api_endpoint)?;

        let mut request = self
            .client
            .get(url)
            .bearer_auth(id_token)
            .query(&[("key", key)]);
        if let Some(secs) = self.expiration_secs {
            request = request.query(&[("expiration", secs)]);
        }

        debug!(key, "Requesting presigned upload URL");
        let response = Self::check_response(request.send().await?).await?;

        let body = response.text().await?;
        let parsed: PresignedUrlResponse = serde_json::from_str(&body)
            .map_err(|e| ApiError::InvalidResponse(format!("failed to decode API response: {}", e)))?;

        if parsed.url.trim().is_empty() {
            return Err(ApiError::InvalidResponse(
                "API response contained an empty url".to_string(),
            ));
        }
        Ok(parsed.url)
    }
}
