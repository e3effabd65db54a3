//! Platform capabilities used by voice input.

use async_trait::async_trait;

use crate::error::{MicrophoneError, VoiceInputError};

// =============================================================================
// Recognizer
// =============================================================================

/// A platform speech recognizer.
///
/// Recognition is single-shot and reports back through [`RecognizerEvent`]s
/// delivered to [`crate::VoiceInputController::handle_event`] by whoever
/// hosts the recognizer.
pub trait SpeechInput: Send + Sync {
    /// Whether recognition is available at all.
    fn is_supported(&self) -> bool;

    /// Begin capturing speech in `locale`.
    fn start(&self, locale: &str) -> Result<(), VoiceInputError>;

    /// Ask the recognizer to stop. It may or may not report `End` afterwards.
    fn stop(&self);
}

/// Acquire-and-release check that microphone access is granted.
#[async_trait]
pub trait MicrophoneProbe: Send + Sync {
    async fn probe(&self) -> Result<(), MicrophoneError>;
}

/// One recognition hypothesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionResult {
    pub transcript: String,
    /// Interim hypotheses are `false` and are discarded.
    pub is_final: bool,
}

impl RecognitionResult {
    pub fn interim(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: false,
        }
    }

    pub fn final_(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: true,
        }
    }
}

/// Callbacks from the platform recognizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizerEvent {
    Started,
    Results(Vec<RecognitionResult>),
    Error(RecognitionErrorKind),
    End,
}

/// Recognizer error codes with their user-facing messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecognitionErrorKind {
    #[error("Microphone access issue - please allow microphone access and try again")]
    Network,
    #[error("Microphone access denied - please allow microphone permissions in your settings")]
    NotAllowed,
    #[error("No speech detected - please speak clearly and try again")]
    NoSpeech,
    #[error("Audio capture failed - please check your microphone connection")]
    AudioCapture,
    #[error("Speech service not allowed - please check your settings")]
    ServiceNotAllowed,
    #[error("Speech recognition grammar error - please try again")]
    BadGrammar,
    #[error("Selected language not supported for speech recognition")]
    LanguageNotSupported,
    #[error("Voice recognition error: {0}. Please check microphone permissions and try again.")]
    Other(String),
}

impl RecognitionErrorKind {
    /// Map a platform error code such as `no-speech`.
    pub fn from_code(code: &str) -> Self {
        match code {
            "network" => Self::Network,
            "not-allowed" => Self::NotAllowed,
            "no-speech" => Self::NoSpeech,
            "audio-capture" => Self::AudioCapture,
            "service-not-allowed" => Self::ServiceNotAllowed,
            "bad-grammar" => Self::BadGrammar,
            "language-not-supported" => Self::LanguageNotSupported,
            other => Self::Other(other.to_string()),
        }
    }
}

// =============================================================================
// Unavailable platform
// =============================================================================

/// Recognizer for hosts without speech recognition.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableRecognizer;

impl SpeechInput for UnavailableRecognizer {
    fn is_supported(&self) -> bool {
        false
    }

    fn start(&self, _locale: &str) -> Result<(), VoiceInputError> {
        Err(VoiceInputError::Unsupported)
    }

    fn stop(&self) {}
}

/// Probe for hosts without audio devices.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableMicrophone;

#[async_trait]
impl MicrophoneProbe for UnavailableMicrophone {
    async fn probe(&self) -> Result<(), MicrophoneError> {
        Err(MicrophoneError::Unsupported)
    }
}
