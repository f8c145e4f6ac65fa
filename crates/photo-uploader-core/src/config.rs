//! Credential record and configuration path resolution.
//!
//! The credential record holds the identity, secret and cached ID token for
//! the single account this tool uploads as. It is stored as JSON at
//! `~/.config/blog-photo-uploader/config.json` unless overridden.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Application name used for the config directory path
pub const APP_NAME: &str = "blog-photo-uploader";

/// Config file name
pub const CONFIG_FILE: &str = "config.json";

/// Environment variable that overrides the config file location
pub const CONFIG_PATH_ENV: &str = "BLOG_PHOTO_UPLOADER_CONFIG";

/// Timeout applied to every remote call (identity provider, presign API, storage PUT).
pub const REQUEST_TIMEOUT_SECS: u64 = 9;

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub client_id: String,
    pub username: String,
    /// Stored in cleartext; the file itself is owner-only.
    pub password: String,
    pub api_endpoint: String,
    /// Empty until the first successful authentication.
    #[serde(default)]
    pub id_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloudfront_domain: Option<String>,
}

impl CredentialRecord {
    /// Name of the first identity field that is blank, if any.
    pub fn missing_identity_field(&self) -> Option<&'static str> {
        if self.client_id.trim().is_empty() {
            Some("client_id")
        } else if self.username.trim().is_empty() {
            Some("username")
        } else if self.password.is_empty() {
            Some("password")
        } else {
            None
        }
    }

    pub fn has_token(&self) -> bool {
        !self.id_token.is_empty()
    }
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("api_endpoint", &self.api_endpoint)
            .field("id_token", &if self.has_token() { "<redacted>" } else { "<empty>" })
            .field("cloudfront_domain", &self.cloudfront_domain)
            .finish()
    }
}

/// Resolve the config file path.
///
/// Order: explicit path, then `BLOG_PHOTO_UPLOADER_CONFIG`, then the
/// platform config directory.
pub fn config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path);
    }
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    default_config_path()
}

/// `<config dir>/blog-photo-uploader/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CredentialRecord {
        CredentialRecord {
            client_id: "client".to_string(),
            username: "alice".to_string(),
            password: "hunter2".to_string(),
            api_endpoint: "https://api.example.com/presign".to_string(),
            id_token: "a.b.c".to_string(),
            cloudfront_domain: None,
        }
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!("{:?}", sample());
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("a.b.c"));
        assert!(rendered.contains("alice"));
    }

    #[test]
    fn test_missing_identity_field() {
        assert_eq!(sample().missing_identity_field(), None);

        let mut record = sample();
        record.username = "  ".to_string();
        assert_eq!(record.missing_identity_field(), Some("username"));

        let mut record = sample();
        record.password.clear();
        assert_eq!(record.missing_identity_field(), Some("password"));
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["client_id"], "client");
        assert_eq!(json["id_token"], "a.b.c");
        // Unset distribution domain is omitted entirely
        assert!(json.get("cloudfront_domain").is_none());
    }

    #[test]
    fn test_missing_token_defaults_to_empty() {
        let json = r#"{"client_id":"c","username":"u","password":"p","api_endpoint":"e"}"#;
        let record: CredentialRecord = serde_json::from_str(json).unwrap();
        assert!(!record.has_token());
        assert_eq!(record.cloudfront_domain, None);
    }

    #[test]
    fn test_explicit_config_path_wins() {
        let path = config_path(Some(PathBuf::from("/tmp/custom.json")));
        assert_eq!(path, Some(PathBuf::from("/tmp/custom.json")));
    }
}
