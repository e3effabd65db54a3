//! VetAssist Speech crate - text-to-speech for bot replies.
//!
//! Cleans reply text for speaking, ranks the platform voice catalog per
//! language, and drives a cancel-then-speak synthesis engine with a single
//! conservative retry when the engine rejects an utterance.

pub mod error;
pub mod mock;
pub mod sanitize;
pub mod synthesis;
pub mod voice;

pub use error::SpeechOutputError;
pub use sanitize::sanitize_for_speech;
pub use synthesis::{LogSynthesizer, SpeakOutcome, SpeechOutput, Utterance, VoiceOutputController};
pub use voice::{rules_for, select_voice, VoiceRule, VoiceSelector};
