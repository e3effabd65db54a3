use serde::{Deserialize, Serialize};

use crate::types::{Message, SessionKey, Settings};

/// Severity of a transient user notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Info,
    Error,
}

/// Everything the chat controller wants a UI to show.
///
/// The controller publishes these on a broadcast channel; UI layers only
/// render them and never reach into controller state directly.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum ChatEvent {
    /// A fresh, empty session became current.
    SessionStarted { session_key: SessionKey },

    /// Persisted messages of the current session were replayed at startup.
    HistoryRestored {
        session_key: SessionKey,
        messages: Vec<Message>,
    },

    /// The current session's local history was removed after the server
    /// confirmed the clear.
    HistoryCleared { session_key: SessionKey },

    /// A message was appended to a session.
    MessageAppended {
        session_key: SessionKey,
        message: Message,
        /// Derived indicator: `floor(message_count / 2)`.
        exchanges: usize,
    },

    /// A request is in flight; show the "thinking" placeholder.
    TypingStarted,

    /// Remove the "thinking" placeholder.
    TypingStopped,

    /// The pending input field was filled (voice transcript or quick action).
    InputFilled { text: String },

    /// The pending input field was cleared after a send.
    InputCleared,

    /// Voice input started or stopped recording.
    RecordingChanged { recording: bool },

    /// Transient toast-style notification.
    Notification {
        level: NotificationLevel,
        text: String,
    },

    /// Detailed analysis of an uploaded image, for a side panel.
    AnalysisReady { title: String, content: String },

    /// Settings changed and were persisted.
    SettingsChanged { settings: Settings },

    /// The chat language (and with it the voice locale) changed.
    LanguageChanged { language: String, locale: String },
}

impl ChatEvent {
    /// Shorthand for a notification event.
    pub fn notify(level: NotificationLevel, text: impl Into<String>) -> Self {
        ChatEvent::Notification {
            level,
            text: text.into(),
        }
    }

    /// Returns a stable event name for logging.
    pub fn event_name(&self) -> &'static str {
        match self {
            ChatEvent::SessionStarted { .. } => "session_started",
            ChatEvent::HistoryRestored { .. } => "history_restored",
            ChatEvent::HistoryCleared { .. } => "history_cleared",
            ChatEvent::MessageAppended { .. } => "message_appended",
            ChatEvent::TypingStarted => "typing_started",
            ChatEvent::TypingStopped => "typing_stopped",
            ChatEvent::InputFilled { .. } => "input_filled",
            ChatEvent::InputCleared => "input_cleared",
            ChatEvent::RecordingChanged { .. } => "recording_changed",
            ChatEvent::Notification { .. } => "notification",
            ChatEvent::AnalysisReady { .. } => "analysis_ready",
            ChatEvent::SettingsChanged { .. } => "settings_changed",
            ChatEvent::LanguageChanged { .. } => "language_changed",
        }
    }
}
