//! Authentication and credential lifecycle.
//!
//! This module provides:
//! - `token`: offline expiry inspection of cached ID tokens
//! - `CredentialStore`: atomic, owner-only persistence of the credential record
//! - `Authenticator`: the identity provider exchange (`CognitoAuthenticator`)
//! - `CredentialManager`: load, check, refresh and re-persist in one call
//!
//! A refreshed token is always written back before it is handed out.

pub mod cognito;
pub mod error;
pub mod manager;
pub mod store;
pub mod token;

pub use cognito::{Authenticator, CognitoAuthenticator};
pub use error::{AuthError, CredentialError, StoreError};
pub use manager::{CredentialManager, TokenSource};
pub use store::CredentialStore;
