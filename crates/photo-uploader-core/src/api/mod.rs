//! Client for the upload-authorization (presign) API.
//!
//! The API is a single `GET <endpoint>?key=<object key>` protected by the
//! user's ID token. It answers with `{ "url": "<presigned PUT url>" }`.

pub mod client;
pub mod error;

pub use client::{ApiClient, UploadAuthorizer};
pub use error::ApiError;
