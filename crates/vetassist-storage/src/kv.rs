//! Key-value persistence capability.

use std::collections::HashMap;
use std::sync::Mutex;

use vetassist_core::error::{Result, VetAssistError};

/// Keys under which the client persists its state. They match the keys the
/// web front-end uses in browser local storage.
pub mod keys {
    /// Settings blob (JSON object).
    pub const SETTINGS: &str = "chatbot-settings";
    /// Session history blob (JSON map of session key -> message list).
    pub const SESSIONS: &str = "chatbot_sessions";
    /// Current session key (plain string).
    pub const CURRENT_SESSION: &str = "chatbot_current_session";
}

/// Durable string-to-string store.
///
/// Every key is read and written independently; there is no transaction
/// spanning several keys and no schema versioning of the values.
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if the key was never written or was removed.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory store for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| VetAssistError::Storage(format!("store lock poisoned: {}", e)))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| VetAssistError::Storage(format!("store lock poisoned: {}", e)))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| VetAssistError::Storage(format!("store lock poisoned: {}", e)))?;
        entries.remove(key);
        Ok(())
    }
}
