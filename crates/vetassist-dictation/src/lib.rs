//! VetAssist Dictation crate - voice input for the chat controller.
//!
//! Provides the Idle/Recording state machine, the capability traits for the
//! platform recognizer and microphone permission probe, and the controller
//! that gates recording on settings, capability, and permission before any
//! recognizer is started.

pub mod capability;
pub mod controller;
pub mod error;
pub mod mock;
pub mod state;

pub use capability::{
    MicrophoneProbe, RecognitionErrorKind, RecognitionResult, RecognizerEvent, SpeechInput,
    UnavailableMicrophone, UnavailableRecognizer,
};
pub use controller::{RecognizerOutcome, VoiceInputController};
pub use error::{MicrophoneError, VoiceInputError};
pub use state::{RecordingState, StateMachine};
