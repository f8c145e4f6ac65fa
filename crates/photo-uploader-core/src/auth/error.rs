use std::path::PathBuf;

use thiserror::Error;

/// Failures reading or writing the credential record.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("no configuration found at {}; run `blog-photo-uploader auth` to create one", .0.display())]
    NotFound(PathBuf),

    #[error("configuration at {} is corrupt", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to {action} {}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

/// Failures from the identity provider exchange.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("identity provider rejected the credentials ({code}): {message}")]
    Rejected { code: String, message: String },

    #[error("identity provider unreachable")]
    Unreachable(#[source] reqwest::Error),

    #[error("failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),

    #[error("identity provider error: status {status}, response {body}")]
    Provider { status: u16, body: String },

    #[error("identity provider returned no ID token{}", .challenge.as_ref().map(|c| format!(" (challenge {} required)", c)).unwrap_or_default())]
    MissingToken { challenge: Option<String> },

    #[error("invalid identity provider response: {0}")]
    InvalidResponse(String),
}

impl AuthError {
    /// True when re-entering the username or password could fix the failure.
    pub fn is_rejected(&self) -> bool {
        matches!(self, AuthError::Rejected { .. })
    }
}

/// Failures resolving a record that holds a usable token.
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("configuration is missing `{0}`; run `blog-photo-uploader auth --force` to recreate it")]
    Incomplete(&'static str),

    #[error("failed to refresh ID token")]
    RefreshFailed(#[source] AuthError),

    #[error("failed to save updated config")]
    PersistFailed(#[source] StoreError),

    #[error("authentication failed")]
    Authentication(#[source] AuthError),
}

impl CredentialError {
    /// The provider error behind this failure, if there is one.
    pub fn auth_error(&self) -> Option<&AuthError> {
        match self {
            CredentialError::RefreshFailed(e) | CredentialError::Authentication(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_actionable() {
        let err = StoreError::NotFound(PathBuf::from("/home/a/.config/x/config.json"));
        let msg = err.to_string();
        assert!(msg.contains("/home/a/.config/x/config.json"));
        assert!(msg.contains("auth"));
    }

    #[test]
    fn test_missing_token_display() {
        let err = AuthError::MissingToken {
            challenge: Some("NEW_PASSWORD_REQUIRED".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "identity provider returned no ID token (challenge NEW_PASSWORD_REQUIRED required)"
        );
        let err = AuthError::MissingToken { challenge: None };
        assert_eq!(err.to_string(), "identity provider returned no ID token");
    }

    #[test]
    fn test_only_rejected_suggests_new_credentials() {
        let rejected = AuthError::Rejected {
            code: "NotAuthorizedException".to_string(),
            message: "Incorrect username or password.".to_string(),
        };
        assert!(rejected.is_rejected());
        let provider = AuthError::Provider {
            status: 500,
            body: "boom".to_string(),
        };
        assert!(!provider.is_rejected());
    }

    #[test]
    fn test_io_cause_is_in_chain_not_message() {
        let err = StoreError::io(
            "read",
            "/tmp/config.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
        );
        assert_eq!(err.to_string(), "failed to read /tmp/config.json");
        assert_eq!(
            format!("{:#}", anyhow::Error::from(err)),
            "failed to read /tmp/config.json: permission denied"
        );
    }

    #[test]
    fn test_refresh_failed_exposes_cause() {
        let err = CredentialError::RefreshFailed(AuthError::Provider {
            status: 503,
            body: "unavailable".to_string(),
        });
        assert_eq!(err.to_string(), "failed to refresh ID token");
        let chain = format!("{:#}", anyhow::Error::from(err));
        assert!(chain.contains("failed to refresh ID token: identity provider error: status 503"));
        assert!(chain.contains("unavailable"));
    }
}
