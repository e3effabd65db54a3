use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, VetAssistError};

/// Maximum upload size accepted before any network call (16 MiB).
pub const DEFAULT_UPLOAD_MAX_BYTES: u64 = 16 * 1024 * 1024;

/// Prompt sent alongside every uploaded file.
pub const DEFAULT_UPLOAD_PROMPT: &str =
    "Please analyze this file and provide insights about animal health or disease information.";

/// Top-level configuration for the VetAssist client.
///
/// Loaded from `~/.vetassist/config.toml` by default. Every section is
/// optional; missing sections and fields fall back to their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VetAssistConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
}

impl VetAssistConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: VetAssistConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| VetAssistError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory holding the local key-value database.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.vetassist/data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl GeneralConfig {
    /// The data directory with a leading `~` expanded to the home directory.
    pub fn resolved_data_dir(&self) -> PathBuf {
        expand_home(&self.data_dir)
    }
}

/// Remote chat server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the veterinary web application.
    pub base_url: String,
    /// Per-request timeout. Absent means requests may wait indefinitely.
    pub request_timeout_secs: Option<u64>,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            request_timeout_secs: None,
            user_agent: format!("vetassist/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Chat session and upload behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Chat language used until the user picks another.
    pub default_language: String,
    /// Drop replies that arrive after the session they were sent from was
    /// replaced or cleared, instead of appending them to the new session.
    pub discard_stale_responses: bool,
    /// Largest file accepted for upload, in bytes.
    pub upload_max_bytes: u64,
    /// MIME types accepted for upload.
    pub upload_allowed_types: Vec<String>,
    /// Question sent with every uploaded file.
    pub upload_prompt: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_language: "en".to_string(),
            discard_stale_responses: false,
            upload_max_bytes: DEFAULT_UPLOAD_MAX_BYTES,
            upload_allowed_types: vec![
                "image/jpeg".to_string(),
                "image/jpg".to_string(),
                "image/png".to_string(),
                "image/webp".to_string(),
                "application/pdf".to_string(),
            ],
            upload_prompt: DEFAULT_UPLOAD_PROMPT.to_string(),
        }
    }
}

/// Prosody parameters for one kind of utterance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prosody {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Prosody {
    pub const fn new(rate: f32, pitch: f32, volume: f32) -> Self {
        Self {
            rate,
            pitch,
            volume,
        }
    }
}

/// Speech input/output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Locale used when a chat language has no entry in the locale table.
    pub default_locale: String,
    /// Delay before the single fallback retry after a synthesis error.
    pub fallback_retry_delay_ms: u64,
    /// Prosody for ordinary utterances.
    pub standard: Prosody,
    /// Prosody for Marathi utterances with a matching voice.
    pub marathi: Prosody,
    /// Prosody for Marathi utterances when no suitable voice exists.
    pub marathi_no_voice: Prosody,
    /// Prosody for the fallback retry.
    pub fallback: Prosody,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            default_locale: "en-US".to_string(),
            fallback_retry_delay_ms: 500,
            standard: Prosody::new(0.9, 1.0, 0.8),
            marathi: Prosody::new(0.8, 1.0, 0.95),
            marathi_no_voice: Prosody::new(0.7, 1.0, 0.9),
            fallback: Prosody::new(0.6, 0.9, 0.9),
        }
    }
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        return PathBuf::from(home).join(rest);
    }
    PathBuf::from(path)
}
