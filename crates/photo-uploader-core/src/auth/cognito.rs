//! Identity provider exchange (Amazon Cognito user pools).
//!
//! Uses the `USER_PASSWORD_AUTH` flow of `InitiateAuth`, which is a plain
//! JSON POST against the regional endpoint and needs no request signing.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{token, AuthError};
use crate::config::REQUEST_TIMEOUT_SECS;
use crate::utils::format::truncate_body;

/// Region used when neither `AWS_REGION` nor `AWS_DEFAULT_REGION` is set
const DEFAULT_REGION: &str = "ap-northeast-1";

const INITIATE_AUTH_TARGET: &str = "AWSCognitoIdentityProviderService.InitiateAuth";
const AMZ_JSON: &str = "application/x-amz-json-1.1";

/// Provider exception types that mean the credentials themselves are wrong.
const REJECTION_CODES: &[&str] = &[
    "NotAuthorizedException",
    "UserNotFoundException",
    "UserNotConfirmedException",
    "PasswordResetRequiredException",
];

/// Exchange an identity and secret for a bearer token.
///
/// One remote call, no retries. Implementations must only return tokens the
/// token inspector can read.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(
        &self,
        client_id: &str,
        username: &str,
        password: &str,
    ) -> Result<String, AuthError>;
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthRequest<'a> {
    auth_flow: &'static str,
    client_id: &'a str,
    auth_parameters: HashMap<&'static str, &'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    authentication_result: Option<AuthenticationResult>,
    challenge_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    id_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    #[serde(rename = "__type")]
    error_type: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

/// Clone is cheap - reqwest::Client uses Arc internally.
#[derive(Clone)]
pub struct CognitoAuthenticator {
    client: Client,
    endpoint: String,
}

impl CognitoAuthenticator {
    /// Authenticator for the regional endpoint of `region`.
    pub fn new(region: &str) -> Result<Self, AuthError> {
        Self::with_endpoint(format!("https://cognito-idp.{}.amazonaws.com/", region))
    }

    /// Region from `AWS_REGION`, then `AWS_DEFAULT_REGION`, then the default.
    pub fn from_env() -> Result<Self, AuthError> {
        let region = std::env::var("AWS_REGION")
            .or_else(|_| std::env::var("AWS_DEFAULT_REGION"))
            .ok()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        Self::new(region.trim())
    }

    /// Authenticator against an explicit endpoint URL.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self, AuthError> {
        Self::from_builder(Client::builder(), endpoint)
    }

    fn from_builder(builder: ClientBuilder, endpoint: impl Into<String>) -> Result<Self, AuthError> {
        let client = builder
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(AuthError::HttpClient)?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn error_from_status(status: reqwest::StatusCode, body: &str) -> AuthError {
        let parsed = serde_json::from_str::<ProviderErrorBody>(body).ok();
        let code = parsed
            .as_ref()
            .and_then(|b| b.error_type.as_deref())
            // Some responses prefix the type with a namespace: "com.amazon...#NotAuthorizedException"
            .map(|t| t.rsplit('#').next().unwrap_or(t).to_string());

        match code {
            Some(code) if REJECTION_CODES.contains(&code.as_str()) => AuthError::Rejected {
                message: parsed
                    .and_then(|b| b.message)
                    .unwrap_or_else(|| "credentials rejected".to_string()),
                code,
            },
            _ => AuthError::Provider {
                status: status.as_u16(),
                body: truncate_body(body),
            },
        }
    }
}

#[async_trait]
impl Authenticator for CognitoAuthenticator {
    async fn authenticate(
        &self,
        client_id: &str,
        username: &str,
        password: &str,
    ) -> Result<String, AuthError> {
        let request = InitiateAuthRequest {
            auth_flow: "USER_PASSWORD_AUTH",
            client_id,
            auth_parameters: HashMap::from([("USERNAME", username), ("PASSWORD", password)]),
        };
        let body = serde_json::to_vec(&request)
            .map_err(|e| AuthError::InvalidResponse(format!("failed to encode request: {}", e)))?;

        debug!(endpoint = %self.endpoint, username, "Sending InitiateAuth request");

        let response = self
            .client
            .post(&self.endpoint)
            .header(header::CONTENT_TYPE, AMZ_JSON)
            .header("X-Amz-Target", INITIATE_AUTH_TARGET)
            .body(body)
            .send()
            .await
            .map_err(AuthError::Unreachable)?;

        let status = response.status();
        let text = response.text().await.map_err(AuthError::Unreachable)?;
        if !status.is_success() {
            return Err(Self::error_from_status(status, &text));
        }

        let parsed: InitiateAuthResponse = serde_json::from_str(&text)
            .map_err(|e| AuthError::InvalidResponse(format!("failed to parse auth response: {}", e)))?;

        let id_token = parsed
            .authentication_result
            .and_then(|r| r.id_token)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken {
                challenge: parsed.challenge_name,
            })?;

        if token::expires_at(&id_token).is_none() {
            return Err(AuthError::InvalidResponse(
                "ID token has no readable expiry claim".to_string(),
            ));
        }

        debug!("InitiateAuth returned an ID token");
        Ok(id_token)
    }
}
