//! Core library for blog-photo-uploader.
//!
//! Keeps a single cached ID token valid (refreshing and re-persisting it
//! when it expires), trades it for a presigned upload URL, and PUTs a file
//! to that URL.

pub mod api;
pub mod auth;
pub mod config;
pub mod upload;
pub mod utils;

pub use api::{ApiClient, ApiError, UploadAuthorizer};
pub use auth::{
    AuthError, Authenticator, CognitoAuthenticator, CredentialError, CredentialManager,
    CredentialStore, StoreError, TokenSource,
};
pub use config::CredentialRecord;
pub use upload::{HttpTransfer, TransferError, TransferExecutor, UploadError, UploadOutcome};
