use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::language::DEFAULT_VOICE_LOCALE;

// =============================================================================
// Messages
// =============================================================================

/// Who authored a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Bot => write!(f, "bot"),
        }
    }
}

/// A single chat message. Immutable once created.
///
/// The text is persisted under the `message` key so stored histories stay
/// readable by the web front-end.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    #[serde(rename = "message", alias = "text")]
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message stamped with the current time.
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

// =============================================================================
// Session keys
// =============================================================================

const KEY_PREFIX: &str = "chat_";
const KEY_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Opaque conversation identifier: `chat_<unix millis>_<9 base-36 chars>`.
///
/// Keys assigned by the server may use any format; only locally generated
/// keys are guaranteed to embed their creation time.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionKey(String);

impl SessionKey {
    /// Generate a fresh key from the current time and a random suffix.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let suffix: String = (0..KEY_SUFFIX_LEN)
            .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
            .collect();
        Self(format!(
            "{}{}_{}",
            KEY_PREFIX,
            Utc::now().timestamp_millis(),
            suffix
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Creation time embedded in a generated key, if present.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let millis: i64 = self.0.split('_').nth(1)?.parse().ok()?;
        Utc.timestamp_millis_opt(millis).single()
    }
}

impl From<String> for SessionKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Voices
// =============================================================================

/// One entry of the platform's synthesis voice catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    /// BCP-47 style language tag, e.g. `hi-IN`.
    pub lang: String,
    /// Whether the platform marks this as its default voice.
    pub is_default: bool,
}

impl Voice {
    pub fn new(name: impl Into<String>, lang: impl Into<String>, is_default: bool) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
            is_default,
        }
    }

    pub fn to_ref(&self) -> VoiceRef {
        VoiceRef {
            name: self.name.clone(),
            lang: self.lang.clone(),
        }
    }
}

/// Non-owning reference into the voice catalog, looked up by name + lang.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoiceRef {
    pub name: String,
    pub lang: String,
}

// =============================================================================
// Settings
// =============================================================================

/// User-facing preferences, persisted as one JSON blob.
///
/// Field names match the blob written by the web front-end. Missing fields
/// in a stored blob take their default values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub tts_enabled: bool,
    pub voice_input_enabled: bool,
    pub dark_mode_enabled: bool,
    pub auto_scroll_enabled: bool,
    pub voice_language: String,
    /// Recomputed on every language switch; never persisted.
    #[serde(skip)]
    pub selected_voice: Option<VoiceRef>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tts_enabled: true,
            voice_input_enabled: true,
            dark_mode_enabled: false,
            auto_scroll_enabled: true,
            voice_language: DEFAULT_VOICE_LOCALE.to_string(),
            selected_voice: None,
        }
    }
}
