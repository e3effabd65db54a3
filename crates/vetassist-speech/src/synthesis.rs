//! Voice output controller.
//!
//! Every utterance cancels the one in flight; there is no queue. When the
//! engine rejects an utterance in a non-default locale, one retry is made
//! after a short delay with the language's fallback locale and gentler
//! prosody. A second failure is logged and dropped.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use vetassist_core::config::{Prosody, VoiceConfig};
use vetassist_core::language::fallback_locale_for;
use vetassist_core::types::{Settings, Voice, VoiceRef};

use crate::error::SpeechOutputError;
use crate::sanitize::sanitize_for_speech;
use crate::voice::VoiceSelector;

// =============================================================================
// Engine capability
// =============================================================================

/// One request to the synthesis engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub lang: String,
    pub voice: Option<VoiceRef>,
    pub prosody: Prosody,
}

/// A platform speech synthesis engine.
pub trait SpeechOutput: Send + Sync {
    /// Current voice catalog. May be empty until the platform loads it.
    fn voices(&self) -> Vec<Voice>;

    /// Stop whatever is being spoken.
    fn cancel(&self);

    /// Speak an utterance. An error means the engine rejected it.
    fn speak(&self, utterance: &Utterance) -> Result<(), SpeechOutputError>;

    fn pause(&self);
    fn resume(&self);
    fn is_speaking(&self) -> bool;
    fn is_paused(&self) -> bool;
}

/// Engine that writes utterances to the log instead of a speaker.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSynthesizer;

impl SpeechOutput for LogSynthesizer {
    fn voices(&self) -> Vec<Voice> {
        Vec::new()
    }

    fn cancel(&self) {}

    fn speak(&self, utterance: &Utterance) -> Result<(), SpeechOutputError> {
        info!(
            lang = %utterance.lang,
            voice = utterance.voice.as_ref().map(|v| v.name.as_str()).unwrap_or("default"),
            rate = utterance.prosody.rate,
            "Speaking: {}",
            utterance.text
        );
        Ok(())
    }

    fn pause(&self) {}
    fn resume(&self) {}

    fn is_speaking(&self) -> bool {
        false
    }

    fn is_paused(&self) -> bool {
        false
    }
}

// =============================================================================
// Controller
// =============================================================================

/// Result of a speak request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakOutcome {
    /// Speech disabled, or nothing left to say after cleanup.
    Skipped,
    Spoken,
    /// The first attempt failed and the fallback retry was accepted.
    SpokenWithFallback,
    /// A newer utterance started before the retry was due.
    Superseded,
    /// Both attempts failed, or the failure was not retryable.
    Failed,
}

pub struct VoiceOutputController {
    engine: Arc<dyn SpeechOutput>,
    config: VoiceConfig,
    selector: VoiceSelector,
    generation: AtomicU64,
    paused_by_us: AtomicBool,
}

impl std::fmt::Debug for VoiceOutputController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceOutputController")
            .field("selector", &self.selector)
            .field("paused_by_us", &self.paused_by_us.load(Ordering::SeqCst))
            .finish()
    }
}

impl VoiceOutputController {
    pub fn new(engine: Arc<dyn SpeechOutput>, config: VoiceConfig) -> Self {
        Self {
            engine,
            config,
            selector: VoiceSelector::new(),
            generation: AtomicU64::new(0),
            paused_by_us: AtomicBool::new(false),
        }
    }

    /// Best catalog voice for a chat language and its locale.
    pub fn select_voice_for(&self, language: &str, locale: &str) -> Option<Voice> {
        self.selector.select(language, locale, &self.engine.voices())
    }

    /// Drop cached voice choices after the catalog changed.
    pub fn voices_changed(&self) {
        self.selector.invalidate();
    }

    /// Speak `text` for chat language `language` under the user's settings.
    pub async fn speak(&self, text: &str, language: &str, settings: &Settings) -> SpeakOutcome {
        if !settings.tts_enabled || text.trim().is_empty() {
            debug!("TTS disabled or empty text");
            return SpeakOutcome::Skipped;
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.engine.cancel();
        self.paused_by_us.store(false, Ordering::SeqCst);

        let clean = sanitize_for_speech(text, language);
        if clean.is_empty() {
            return SpeakOutcome::Skipped;
        }

        let utterance = self.build_utterance(clean, language, settings);
        let err = match self.engine.speak(&utterance) {
            Ok(()) => return SpeakOutcome::Spoken,
            Err(e) => e,
        };
        warn!(error = %err, lang = %utterance.lang, "TTS error");

        if utterance.lang.eq_ignore_ascii_case(&self.config.default_locale) {
            return SpeakOutcome::Failed;
        }
        let fallback_lang = fallback_locale_for(language);
        if fallback_lang.eq_ignore_ascii_case(&utterance.lang) {
            return SpeakOutcome::Failed;
        }

        tokio::time::sleep(Duration::from_millis(self.config.fallback_retry_delay_ms)).await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Fallback retry superseded by newer utterance");
            return SpeakOutcome::Superseded;
        }

        let fallback = Utterance {
            text: utterance.text,
            lang: fallback_lang.to_string(),
            voice: None,
            prosody: self.config.fallback,
        };
        info!(lang = %fallback.lang, "Retrying TTS with fallback locale");
        match self.engine.speak(&fallback) {
            Ok(()) => SpeakOutcome::SpokenWithFallback,
            Err(e) => {
                warn!(error = %e, "Fallback TTS failed, giving up");
                SpeakOutcome::Failed
            }
        }
    }

    fn build_utterance(&self, text: String, language: &str, settings: &Settings) -> Utterance {
        if language == "mr" {
            return match self.select_voice_for(language, &settings.voice_language) {
                Some(voice) => Utterance {
                    text,
                    lang: voice.lang.clone(),
                    voice: Some(voice.to_ref()),
                    prosody: self.config.marathi,
                },
                None => Utterance {
                    text,
                    lang: "mr-IN".to_string(),
                    voice: None,
                    prosody: self.config.marathi_no_voice,
                },
            };
        }

        let voice = settings.selected_voice.clone().or_else(|| {
            self.select_voice_for(language, &settings.voice_language)
                .map(|v| v.to_ref())
        });
        let lang = voice
            .as_ref()
            .map(|v| v.lang.clone())
            .unwrap_or_else(|| settings.voice_language.clone());
        Utterance {
            text,
            lang,
            voice,
            prosody: self.config.standard,
        }
    }

    /// Pause while hidden; resume on return only if this controller paused.
    pub fn on_visibility_change(&self, hidden: bool) {
        if hidden {
            if self.engine.is_speaking() && !self.engine.is_paused() {
                self.engine.pause();
                self.paused_by_us.store(true, Ordering::SeqCst);
                debug!("Speech paused while hidden");
            }
        } else if self.paused_by_us.swap(false, Ordering::SeqCst) && self.engine.is_paused() {
            self.engine.resume();
            debug!("Speech resumed");
        }
    }

    /// Stop speaking immediately.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.paused_by_us.store(false, Ordering::SeqCst);
        self.engine.cancel();
    }
}

// =============================================================================
// Tests
// =============================================================================
