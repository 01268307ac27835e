// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session token cache.
//!
//! The token lives in memory and, when a path is configured, in a file so
//! that consecutive CLI invocations share one login.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

/// Cached session token, optionally persisted to disk.
pub struct TokenCache {
    path: Option<PathBuf>,
    current: Mutex<Option<SecretString>>,
}

impl TokenCache {
    /// Memory-only cache.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            current: Mutex::new(None),
        }
    }

    /// File-backed cache. An existing token file is loaded eagerly.
    pub fn persistent(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let current = match std::fs::read_to_string(&path) {
            Ok(contents) => {
                let token = contents.trim();
                (!token.is_empty()).then(|| SecretString::from(token.to_owned()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e),
        };
        debug!(path = %path.display(), cached = current.is_some(), "token cache opened");
        Ok(Self {
            path: Some(path),
            current: Mutex::new(current),
        })
    }

    /// The cached token, if any.
    pub fn get(&self) -> Option<SecretString> {
        self.lock()
            .as_ref()
            .map(|t| SecretString::from(t.expose_secret().to_owned()))
    }

    pub fn is_set(&self) -> bool {
        self.lock().is_some()
    }

    /// Replace the cached token and persist it.
    pub fn store(&self, token: &str) -> std::io::Result<()> {
        if let Some(path) = &self.path {
            write_private(path, token)?;
        }
        *self.lock() = Some(SecretString::from(token.to_owned()));
        Ok(())
    }

    /// Forget the cached token and remove the file.
    pub fn clear(&self) -> std::io::Result<()> {
        *self.lock() = None;
        if let Some(path) = &self.path {
            match std::fs::remove_file(path) {
                Ok(()) => debug!(path = %path.display(), "token cache cleared"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<SecretString>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCache")
            .field("path", &self.path)
            .field("token", &self.is_set().then_some("[REDACTED]"))
            .finish()
    }
}

fn write_private(path: &Path, token: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    use std::io::Write;
    let mut file = options.open(path)?;
    file.write_all(token.as_bytes())?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_cache_store_and_clear() {
        let cache = TokenCache::in_memory();
        assert!(cache.get().is_none());
        cache.store("tok").unwrap();
        assert_eq!(cache.get().unwrap().expose_secret(), "tok");
        cache.clear().unwrap();
        assert!(!cache.is_set());
    }

    #[test]
    fn persistent_cache_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.token");

        let cache = TokenCache::persistent(&path).unwrap();
        assert!(!cache.is_set());
        cache.store("abc.def.ghi").unwrap();

        let reopened = TokenCache::persistent(&path).unwrap();
        assert_eq!(reopened.get().unwrap().expose_secret(), "abc.def.ghi");

        reopened.clear().unwrap();
        assert!(!path.exists());
        assert!(!TokenCache::persistent(&path).unwrap().is_set());
    }

    #[test]
    fn clear_without_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TokenCache::persistent(dir.path().join("missing.token")).unwrap();
        cache.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn token_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.token");
        TokenCache::persistent(&path).unwrap().store("t").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn debug_hides_token() {
        let cache = TokenCache::in_memory();
        cache.store("very-secret-token").unwrap();
        let debug = format!("{cache:?}");
        assert!(!debug.contains("very-secret-token"));
    }
}
