//! Settings persistence.

use tracing::{debug, warn};

use vetassist_core::error::Result;
use vetassist_core::types::Settings;

use crate::kv::{keys, KeyValueStore};

/// Load settings, merging whatever was persisted over the defaults.
///
/// A missing or unreadable blob yields the defaults; the failure is logged.
pub fn load_settings(kv: &dyn KeyValueStore) -> Settings {
    match kv.get(keys::SETTINGS) {
        Ok(Some(raw)) => match serde_json::from_str::<Settings>(&raw) {
            Ok(settings) => {
                debug!("Settings loaded from store");
                settings
            }
            Err(e) => {
                warn!(error = %e, "Stored settings unreadable, using defaults");
                Settings::default()
            }
        },
        Ok(None) => {
            debug!("No saved settings found, using defaults");
            Settings::default()
        }
        Err(e) => {
            warn!(error = %e, "Failed to read settings, using defaults");
            Settings::default()
        }
    }
}

/// Persist the full settings blob.
pub fn save_settings(kv: &dyn KeyValueStore, settings: &Settings) -> Result<()> {
    let raw = serde_json::to_string(settings)?;
    kv.set(keys::SETTINGS, &raw)
}
