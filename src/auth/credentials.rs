//! Credential storage
//!
//! The shell only needs three things from a credential store: whether a
//! user exists, their stored password, and registering a new user.

use log::info;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::error::StoreError;

/// Persistence seam for user credentials.
pub trait CredentialStore: Send {
    fn exists(&self, username: &str) -> bool;

    fn get(&self, username: &str) -> Option<String>;

    fn add(&mut self, username: &str, password: &str) -> Result<(), StoreError>;
}

/// In-memory store, for tests and throwaway runs
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    users: BTreeMap<String, String>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `(username, password)` pairs
    pub fn with_users<'a>(users: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            users: users
                .into_iter()
                .map(|(u, p)| (u.to_string(), p.to_string()))
                .collect(),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn exists(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    fn get(&self, username: &str) -> Option<String> {
        self.users.get(username).cloned()
    }

    fn add(&mut self, username: &str, password: &str) -> Result<(), StoreError> {
        self.users.insert(username.to_string(), password.to_string());
        Ok(())
    }
}

/// Store backed by a JSON object file: `{ "alice": "secret", ... }`
///
/// The whole file is loaded on open and rewritten on every `add`, through a
/// temporary file that is renamed into place.
#[derive(Debug)]
pub struct JsonCredentialStore {
    path: PathBuf,
    users: BTreeMap<String, String>,
}

impl JsonCredentialStore {
    /// Opens the store at `path`; a missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let users = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(StoreError::from(e)),
        };

        info!(
            "Loaded {} user(s) from credential store {}",
            users.len(),
            path.display()
        );
        Ok(Self { path, users })
    }

    fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, serde_json::to_string_pretty(&self.users)?)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

impl CredentialStore for JsonCredentialStore {
    fn exists(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    fn get(&self, username: &str) -> Option<String> {
        self.users.get(username).cloned()
    }

    fn add(&mut self, username: &str, password: &str) -> Result<(), StoreError> {
        let previous = self
            .users
            .insert(username.to_string(), password.to_string());

        if let Err(e) = self.persist() {
            // Keep memory in step with disk
            match previous {
                Some(old) => self.users.insert(username.to_string(), old),
                None => self.users.remove(username),
            };
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryCredentialStore::with_users([("alice", "alice123")]);
        assert!(store.exists("alice"));
        assert!(!store.exists("bob"));
        store.add("bob", "bob123").unwrap();
        assert_eq!(store.get("bob").as_deref(), Some("bob123"));
    }

    #[test]
    fn test_json_store_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonCredentialStore::open(dir.path().join("users.json")).unwrap();
        assert!(!store.exists("alice"));
    }

    #[test]
    fn test_json_store_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state/users.json");

        let mut store = JsonCredentialStore::open(&path).unwrap();
        store.add("alice", "alice123").unwrap();
        assert!(path.is_file());
        assert!(!path.with_extension("json.tmp").exists());

        let reopened = JsonCredentialStore::open(&path).unwrap();
        assert_eq!(reopened.get("alice").as_deref(), Some("alice123"));
    }

    #[test]
    fn test_json_store_reads_reference_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");
        fs::write(&path, r#"{"alice": "a1", "bob": "b2"}"#).unwrap();

        let store = JsonCredentialStore::open(&path).unwrap();
        assert_eq!(store.get("bob").as_deref(), Some("b2"));
    }

    #[test]
    fn test_json_store_rejects_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            JsonCredentialStore::open(&path),
            Err(StoreError::Json(_))
        ));
    }
}
