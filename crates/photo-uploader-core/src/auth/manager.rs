//! Resolves a credential record that holds a usable ID token.

use tracing::{debug, info, warn};

use super::{token, Authenticator, CredentialError, CredentialStore};
use crate::config::CredentialRecord;

/// How the returned record's token was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// Cached token was still valid; no network call and no write.
    Cached,
    /// Cached token was expired and has been replaced and persisted.
    Refreshed,
}

pub struct CredentialManager<A> {
    store: CredentialStore,
    authenticator: A,
}

impl<A: Authenticator> CredentialManager<A> {
    pub fn new(store: CredentialStore, authenticator: A) -> Self {
        Self {
            store,
            authenticator,
        }
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Load the record and make sure its token is not expired.
    ///
    /// An expired token is exchanged for a new one and the record is written
    /// back before it is returned. A missing or corrupt config is an error;
    /// first-run setup goes through [`CredentialManager::bootstrap`].
    pub async fn resolve_valid_record(&self) -> Result<CredentialRecord, CredentialError> {
        self.resolve_valid_record_with_source()
            .await
            .map(|(record, _)| record)
    }

    /// Same as [`CredentialManager::resolve_valid_record`], also reporting
    /// whether a refresh happened.
    pub async fn resolve_valid_record_with_source(
        &self,
    ) -> Result<(CredentialRecord, TokenSource), CredentialError> {
        let mut record = self.store.load()?;

        if !token::is_expired(&record.id_token) {
            debug!("Cached ID token is still valid");
            return Ok((record, TokenSource::Cached));
        }

        if let Some(field) = record.missing_identity_field() {
            return Err(CredentialError::Incomplete(field));
        }

        debug!(username = %record.username, "Cached ID token expired, re-authenticating");
        let id_token = self
            .authenticator
            .authenticate(&record.client_id, &record.username, &record.password)
            .await
            .map_err(|e| {
                warn!(error = %e, "ID token refresh failed");
                CredentialError::RefreshFailed(e)
            })?;

        record.id_token = id_token;
        self.store
            .save(&record)
            .map_err(CredentialError::PersistFailed)?;

        info!(path = %self.store.path().display(), "ID token refreshed");
        Ok((record, TokenSource::Refreshed))
    }

    /// First-run setup: authenticate the entered fields once and save.
    ///
    /// Nothing is written unless authentication succeeds.
    pub async fn bootstrap(
        &self,
        mut record: CredentialRecord,
    ) -> Result<CredentialRecord, CredentialError> {
        if let Some(field) = record.missing_identity_field() {
            return Err(CredentialError::Incomplete(field));
        }

        record.id_token = self
            .authenticator
            .authenticate(&record.client_id, &record.username, &record.password)
            .await
            .map_err(CredentialError::Authentication)?;

        self.store
            .save(&record)
            .map_err(CredentialError::PersistFailed)?;

        info!(path = %self.store.path().display(), "Configuration saved");
        Ok(record)
    }
}
