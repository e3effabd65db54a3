//! Error types for voice input.

use vetassist_core::error::VetAssistError;

/// Why the microphone permission probe failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MicrophoneError {
    #[error("Microphone access denied - please allow microphone permissions and try again")]
    Denied,
    #[error("No microphone found - please connect a microphone and try again")]
    NotFound,
    #[error("Microphone not supported")]
    Unsupported,
    #[error("Microphone is being used by another application")]
    Busy,
    #[error("Microphone access failed: {0}")]
    Other(String),
}

/// Errors from starting or driving voice input.
#[derive(Debug, thiserror::Error)]
pub enum VoiceInputError {
    #[error("Voice input is disabled in settings")]
    Disabled,
    #[error("Voice recognition not supported on this platform")]
    Unsupported,
    #[error(transparent)]
    Microphone(#[from] MicrophoneError),
    #[error("Failed to start voice recognition: {0}")]
    Recognizer(String),
    #[error("Invalid recording transition: {0} -> {1}")]
    InvalidTransition(crate::state::RecordingState, crate::state::RecordingState),
}

impl From<VoiceInputError> for VetAssistError {
    fn from(err: VoiceInputError) -> Self {
        VetAssistError::Speech(err.to_string())
    }
}
