//! Shared foundation for the VetAssist chat client: configuration, error
//! type, domain types, and the events the controller publishes to UIs.

pub mod config;
pub mod error;
pub mod events;
pub mod language;
pub mod types;

pub use config::VetAssistConfig;
pub use error::{Result, VetAssistError};
pub use events::{ChatEvent, NotificationLevel};
pub use types::*;
