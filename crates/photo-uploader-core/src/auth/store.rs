//! On-disk credential record storage.
//!
//! One record per installation, addressed by a single path. Writes go to a
//! temporary file in the same directory and are renamed over the target, so
//! a reader sees either the previous complete record or the new one.
//!
//! There is no cross-process lock: two invocations that refresh at the same
//! time both write, and the last rename wins.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use super::StoreError;
use crate::config::CredentialRecord;

#[cfg(unix)]
const DIR_MODE: u32 = 0o700;
#[cfg(unix)]
const FILE_MODE: u32 = 0o600;

#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read and parse the record.
    ///
    /// A missing file is `NotFound`, unparseable content is `Corrupt`, and
    /// every other read failure is `Io`.
    pub fn load(&self) -> Result<CredentialRecord, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(self.path.clone()))
            }
            Err(e) => return Err(StoreError::io("read", &self.path, e)),
        };

        let record = serde_json::from_str(&contents).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        debug!(path = %self.path.display(), "Loaded credential record");
        Ok(record)
    }

    /// Replace the record on disk.
    pub fn save(&self, record: &CredentialRecord) -> Result<(), StoreError> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        create_private_dir(&parent)?;

        let mut contents = serde_json::to_string_pretty(record).map_err(|e| {
            StoreError::io("serialize config for", &self.path, std::io::Error::other(e))
        })?;
        contents.push('\n');

        // NamedTempFile is created 0600 on unix and removed on drop if we bail out early
        let mut tmp = NamedTempFile::new_in(&parent)
            .map_err(|e| StoreError::io("create temporary file in", &parent, e))?;
        tmp.write_all(contents.as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| StoreError::io("write", tmp.path(), e))?;
        set_private_file_mode(tmp.path())?;

        tmp.persist(&self.path)
            .map_err(|e| StoreError::io("replace", &self.path, e.error))?;

        debug!(path = %self.path.display(), "Saved credential record");
        Ok(())
    }
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::DirBuilderExt;

    if dir.is_dir() {
        return Ok(());
    }
    fs::DirBuilder::new()
        .recursive(true)
        .mode(DIR_MODE)
        .create(dir)
        .map_err(|e| StoreError::io("create config directory", dir, e))
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> Result<(), StoreError> {
    fs::create_dir_all(dir).map_err(|e| StoreError::io("create config directory", dir, e))
}

#[cfg(unix)]
fn set_private_file_mode(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(FILE_MODE))
        .map_err(|e| StoreError::io("set permissions on", path, e))
}

#[cfg(not(unix))]
fn set_private_file_mode(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}
