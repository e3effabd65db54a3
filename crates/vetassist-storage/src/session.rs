//! Session store: durable map of session key -> ordered messages, plus the
//! pointer to the current session.
//!
//! Every mutation rewrites the whole history blob and the current-session
//! pointer. Write failures are logged and swallowed; in-memory state is
//! always updated first, so the caller's view stays consistent even when
//! the backing store is unavailable.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use vetassist_core::types::{Message, SessionKey, Sender};

use crate::kv::{keys, KeyValueStore};

/// Result of appending a message to a session.
#[derive(Debug, Clone)]
pub struct StoredMessage {
    pub session_key: SessionKey,
    pub message: Message,
    /// `floor(message_count / 2)` for the session after the append.
    pub exchanges: usize,
}

/// Owned session state with persistence as an injected capability.
pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
    history: BTreeMap<SessionKey, Vec<Message>>,
    current: Option<SessionKey>,
}

impl SessionStore {
    /// Create an empty store that has not read anything from `kv`.
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            history: BTreeMap::new(),
            current: None,
        }
    }

    /// Read the persisted history and current-session pointer.
    ///
    /// Reading never writes. An unreadable history blob resets the store to
    /// empty with no current session.
    pub fn restore(kv: Arc<dyn KeyValueStore>) -> Self {
        let mut store = Self::new(kv);

        let history = match store.kv.get(keys::SESSIONS) {
            Ok(Some(raw)) => serde_json::from_str::<BTreeMap<SessionKey, Vec<Message>>>(&raw),
            Ok(None) => Ok(BTreeMap::new()),
            Err(e) => {
                warn!(error = %e, "Failed to read session history");
                Ok(BTreeMap::new())
            }
        };

        match history {
            Ok(history) => store.history = history,
            Err(e) => {
                warn!(error = %e, "Session history unreadable, starting empty");
                return store;
            }
        }

        match store.kv.get(keys::CURRENT_SESSION) {
            Ok(Some(raw)) if !raw.is_empty() => {
                let key = SessionKey::from(raw);
                info!(
                    session_key = %key,
                    messages = store.messages(&key).len(),
                    "Restored current session"
                );
                store.current = Some(key);
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Failed to read current session pointer"),
        }

        store
    }

    /// The session messages are currently appended to.
    pub fn current_key(&self) -> Option<&SessionKey> {
        self.current.as_ref()
    }

    /// Whether the store holds a message list for `key`.
    pub fn contains(&self, key: &SessionKey) -> bool {
        self.history.contains_key(key)
    }

    /// Messages of `key` in insertion order; empty for unknown keys.
    pub fn messages(&self, key: &SessionKey) -> &[Message] {
        self.history.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Messages of the current session.
    pub fn current_messages(&self) -> &[Message] {
        match &self.current {
            Some(key) => self.messages(key),
            None => &[],
        }
    }

    /// `floor(message_count / 2)` for the current session.
    pub fn exchange_count(&self) -> usize {
        self.current_messages().len() / 2
    }

    /// All locally known session keys.
    pub fn session_keys(&self) -> impl Iterator<Item = &SessionKey> {
        self.history.keys()
    }

    /// Return the current key, generating one lazily if there is none.
    ///
    /// The lazily created session is persisted by the first message stored
    /// in it.
    pub fn ensure_current(&mut self) -> SessionKey {
        if let Some(key) = &self.current {
            return key.clone();
        }
        let key = self.fresh_key();
        info!(session_key = %key, "Generated new session key");
        self.current = Some(key.clone());
        key
    }

    /// Generate a fresh key, give it an empty message list, make it current
    /// and persist.
    pub fn start_new_session(&mut self) -> SessionKey {
        let key = self.fresh_key();
        self.history.insert(key.clone(), Vec::new());
        self.current = Some(key.clone());
        self.persist();
        info!(session_key = %key, "Started new chat session");
        key
    }

    /// Append a message to `session` and re-persist the whole store.
    pub fn store_message(
        &mut self,
        session: &SessionKey,
        sender: Sender,
        text: impl Into<String>,
    ) -> StoredMessage {
        let message = Message::new(sender, text);
        let list = self.history.entry(session.clone()).or_default();
        list.push(message.clone());
        let exchanges = list.len() / 2;
        self.persist();
        debug!(session_key = %session, sender = %sender, "Stored message");
        StoredMessage {
            session_key: session.clone(),
            message,
            exchanges,
        }
    }

    /// Delete a session's local history and re-persist.
    ///
    /// The current-session pointer is left as it is, so later messages go
    /// to the same key. Returns whether anything was removed.
    pub fn remove_session(&mut self, key: &SessionKey) -> bool {
        let removed = self.history.remove(key).is_some();
        self.persist();
        if removed {
            info!(session_key = %key, "Session history removed");
        }
        removed
    }

    /// Switch the current session to a key assigned by the server.
    ///
    /// Messages already stored under the old key move to the new one unless
    /// the new key already has history of its own.
    pub fn adopt_key(&mut self, new_key: SessionKey) {
        if self.current.as_ref() == Some(&new_key) {
            return;
        }
        if let Some(old) = self.current.take() {
            if !self.history.contains_key(&new_key) {
                if let Some(messages) = self.history.remove(&old) {
                    self.history.insert(new_key.clone(), messages);
                }
            }
            info!(old = %old, new = %new_key, "Server assigned session key");
        }
        self.current = Some(new_key);
        self.persist();
    }

    fn fresh_key(&self) -> SessionKey {
        loop {
            let key = SessionKey::generate();
            if self.current.as_ref() != Some(&key) && !self.history.contains_key(&key) {
                return key;
            }
        }
    }

    /// Full-overwrite write of both blobs. Failures are logged only.
    fn persist(&self) {
        match serde_json::to_string(&self.history) {
            Ok(raw) => {
                if let Err(e) = self.kv.set(keys::SESSIONS, &raw) {
                    warn!(error = %e, "Failed to save session history");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize session history"),
        }

        let pointer = match &self.current {
            Some(key) => self.kv.set(keys::CURRENT_SESSION, key.as_str()),
            None => self.kv.remove(keys::CURRENT_SESSION),
        };
        if let Err(e) = pointer {
            warn!(error = %e, "Failed to save current session pointer");
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("sessions", &self.history.len())
            .field("current", &self.current)
            .finish()
    }
}
