use thiserror::Error;

use crate::utils::format::truncate_body;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - token may be expired: status code {status}, response {body}")]
    Unauthorized { status: u16, body: String },

    #[error("Access denied: status code {status}, response {body}")]
    AccessDenied { status: u16, body: String },

    #[error("Endpoint not found: status code {status}, response {body}")]
    NotFound { status: u16, body: String },

    #[error("Server error: status code {status}, response {body}")]
    ServerError { status: u16, body: String },

    #[error("API error: status code {status}, response {body}")]
    Unexpected { status: u16, body: String },

    #[error("Network error")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid API endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

impl ApiError {
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let status = status.as_u16();
        let body = truncate_body(body);
        match status {
            401 => ApiError::Unauthorized { status, body },
            403 => ApiError::AccessDenied { status, body },
            404 => ApiError::NotFound { status, body },
            500..=599 => ApiError::ServerError { status, body },
            _ => ApiError::Unexpected { status, body },
        }
    }

    /// HTTP status of the failed response, if the request got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { status, .. }
            | ApiError::AccessDenied { status, .. }
            | ApiError::NotFound { status, .. }
            | ApiError::ServerError { status, .. }
            | ApiError::Unexpected { status, .. } => Some(*status),
            ApiError::NetworkError(e) => e.status().map(|s| s.as_u16()),
            ApiError::InvalidResponse(_) | ApiError::InvalidEndpoint { .. } => None,
        }
    }
}
