//! VetAssist storage crate - durable key-value capability and the session
//! store built on top of it.
//!
//! The browser front-end keeps three independent blobs in local storage:
//! settings, the session-history map, and the current-session pointer. This
//! crate keeps the same three keys behind the [`KeyValueStore`] trait, with a
//! WAL-mode SQLite implementation for real use and an in-memory one for tests.

pub mod db;
pub mod kv;
pub mod migrations;
pub mod session;
pub mod settings;

pub use db::SqliteStore;
pub use kv::{keys, KeyValueStore, MemoryStore};
pub use session::{SessionStore, StoredMessage};
pub use settings::{load_settings, save_settings};
