// Allow dead code: the in-memory store only backs tests
#![allow(dead_code)]

//! Durable storage for the session token.
//!
//! The gateway hands out one opaque bearer token per sign-in; it lives
//! under a single fixed key until the server rejects it. Storage sits
//! behind the `TokenStore` trait so the rest of the app never knows (or
//! cares) whether the token is in the OS keychain, a file, or memory.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use keyring::Entry;

/// Keychain service name for the stored session token
const KEYRING_SERVICE: &str = "mayl";

/// Keychain account name - there is exactly one token slot
const KEYRING_ACCOUNT: &str = "session-token";

/// Where the current session token lives.
///
/// Absence of the key means "logged out"; no other state is kept.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>>;
    fn save(&self, token: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Token storage in the OS keychain.
pub struct KeyringStore;

impl KeyringStore {
    pub fn new() -> Self {
        Self
    }

    fn entry() -> Result<Entry> {
        Entry::new(KEYRING_SERVICE, KEYRING_ACCOUNT).context("Failed to create keyring entry")
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for KeyringStore {
    fn load(&self) -> Result<Option<String>> {
        match Self::entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to read token from keychain"),
        }
    }

    fn save(&self, token: &str) -> Result<()> {
        Self::entry()?
            .set_password(token)
            .context("Failed to store token in keychain")
    }

    fn clear(&self) -> Result<()> {
        match Self::entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}

/// Token storage in a plain file, for machines without a keychain.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl TokenStore for FileStore {
    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read token file {}", self.path.display()))?;
        let token = contents.trim();
        if token.is_empty() {
            Ok(None)
        } else {
            Ok(Some(token.to_string()))
        }
    }

    fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token)
            .with_context(|| format!("Failed to write token file {}", self.path.display()))
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove token file {}", self.path.display()))?;
        }
        Ok(())
    }
}

/// In-memory token storage for tests.
#[derive(Default)]
pub struct MemoryStore {
    token: Mutex<Option<String>>,
}

impl TokenStore for MemoryStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.token.lock().unwrap().clone())
    }

    fn save(&self, token: &str) -> Result<()> {
        *self.token.lock().unwrap() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.token.lock().unwrap() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_roundtrip() {
        let path = std::env::temp_dir().join(format!("mayl-store-test-{}", std::process::id()));
        let store = FileStore::new(path.clone());

        assert_eq!(store.load().unwrap(), None);

        store.save("tok-abc").unwrap();
        assert_eq!(store.load().unwrap(), Some("tok-abc".to_string()));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);

        // Clearing again is a no-op
        store.clear().unwrap();

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_file_store_ignores_blank_contents() {
        let path = std::env::temp_dir().join(format!("mayl-blank-test-{}", std::process::id()));
        std::fs::write(&path, "  \n").unwrap();

        let store = FileStore::new(path.clone());
        assert_eq!(store.load().unwrap(), None);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::default();
        assert_eq!(store.load().unwrap(), None);

        store.save("tok-1").unwrap();
        store.save("tok-2").unwrap();
        assert_eq!(store.load().unwrap(), Some("tok-2".to_string()));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}
