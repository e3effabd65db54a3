//! Voice input controller.
//!
//! Recording starts only after three gates pass, in order: the settings
//! flag, recognizer support, and a microphone permission probe. Stopping
//! always reaches `Idle`, whether or not the recognizer later reports `End`.

use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use vetassist_core::language::DEFAULT_VOICE_LOCALE;

use crate::capability::{MicrophoneProbe, RecognitionErrorKind, RecognizerEvent, SpeechInput};
use crate::error::VoiceInputError;
use crate::state::{RecordingState, StateMachine};

/// What a recognizer event meant for the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizerOutcome {
    /// The recognizer confirmed it is listening.
    Listening,
    /// A final transcript, trimmed, for the pending-input field.
    Transcript(String),
    /// Only interim or blank results; nothing to show.
    Nothing,
    /// Recording ended normally.
    Ended,
    /// Recording ended with an error.
    Failed(RecognitionErrorKind),
}

/// Drives a single-instance platform recognizer through Idle/Recording.
pub struct VoiceInputController {
    state: StateMachine,
    recognizer: Arc<dyn SpeechInput>,
    microphone: Arc<dyn MicrophoneProbe>,
    locale: Mutex<String>,
}

impl std::fmt::Debug for VoiceInputController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceInputController")
            .field("state", &self.state.current())
            .field("locale", &self.locale())
            .field("supported", &self.recognizer.is_supported())
            .finish()
    }
}

impl VoiceInputController {
    pub fn new(recognizer: Arc<dyn SpeechInput>, microphone: Arc<dyn MicrophoneProbe>) -> Self {
        Self {
            state: StateMachine::new(),
            recognizer,
            microphone,
            locale: Mutex::new(DEFAULT_VOICE_LOCALE.to_string()),
        }
    }

    pub fn state(&self) -> RecordingState {
        self.state.current()
    }

    pub fn is_recording(&self) -> bool {
        self.state.current() == RecordingState::Recording
    }

    pub fn is_supported(&self) -> bool {
        self.recognizer.is_supported()
    }

    /// Locale the next recording will use.
    pub fn locale(&self) -> String {
        self.locale.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Re-target the recognizer. Takes effect on the next start.
    pub fn set_locale(&self, locale: &str) {
        *self.locale.lock().unwrap_or_else(|e| e.into_inner()) = locale.to_string();
        debug!(locale = %locale, "Recognizer locale updated");
    }

    /// Start recording if idle.
    ///
    /// Returns `Ok(false)` when already recording (no-op). On any gate
    /// failure the state stays `Idle`.
    pub async fn start(&self, enabled: bool) -> Result<bool, VoiceInputError> {
        if self.is_recording() {
            debug!("Voice input already recording");
            return Ok(false);
        }
        if !enabled {
            return Err(VoiceInputError::Disabled);
        }
        if !self.recognizer.is_supported() {
            return Err(VoiceInputError::Unsupported);
        }

        self.microphone.probe().await?;
        debug!("Microphone permission granted");

        // A concurrent start may have won while the probe was pending.
        if self.state.transition(RecordingState::Recording).is_err() {
            return Ok(false);
        }

        let locale = self.locale();
        if let Err(e) = self.recognizer.start(&locale) {
            self.state.reset();
            warn!(error = %e, "Recognizer failed to start");
            return Err(e);
        }
        info!(locale = %locale, "Voice recognition started");
        Ok(true)
    }

    /// Stop recording. Always leaves the controller `Idle`.
    ///
    /// Returns whether a recording was in progress.
    pub fn stop(&self) -> bool {
        if self.state.reset() == RecordingState::Recording {
            self.recognizer.stop();
            info!("Voice recognition stopped");
            true
        } else {
            false
        }
    }

    /// Stop if recording, otherwise start. Returns the resulting state.
    pub async fn toggle(&self, enabled: bool) -> Result<RecordingState, VoiceInputError> {
        if self.stop() {
            return Ok(RecordingState::Idle);
        }
        self.start(enabled).await?;
        Ok(self.state())
    }

    /// Apply a recognizer callback.
    pub fn handle_event(&self, event: RecognizerEvent) -> RecognizerOutcome {
        match event {
            RecognizerEvent::Started => RecognizerOutcome::Listening,
            RecognizerEvent::Results(results) => {
                let transcript: String = results
                    .iter()
                    .filter(|r| r.is_final)
                    .map(|r| r.transcript.as_str())
                    .collect();
                let transcript = transcript.trim();
                if transcript.is_empty() {
                    RecognizerOutcome::Nothing
                } else {
                    info!(chars = transcript.chars().count(), "Speech recognized");
                    RecognizerOutcome::Transcript(transcript.to_string())
                }
            }
            RecognizerEvent::Error(kind) => {
                self.state.reset();
                warn!(error = ?kind, "Speech recognition error");
                RecognizerOutcome::Failed(kind)
            }
            RecognizerEvent::End => {
                self.state.reset();
                debug!("Speech recognition ended");
                RecognizerOutcome::Ended
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::RecognitionResult;
    use crate::error::MicrophoneError;
    use crate::mock::{MockMicrophone, MockRecognizer};

    fn controller(
        recognizer: Arc<MockRecognizer>,
        microphone: Arc<MockMicrophone>,
    ) -> VoiceInputController {
        VoiceInputController::new(recognizer, microphone)
    }

    #[tokio::test]
    async fn test_start_and_stop() {
        let rec = Arc::new(MockRecognizer::new());
        let mic = Arc::new(MockMicrophone::granted());
        let vc = controller(rec.clone(), mic.clone());

        assert!(vc.start(true).await.unwrap());
        assert_eq!(vc.state(), RecordingState::Recording);
        assert_eq!(rec.starts(), vec!["en-US".to_string()]);
        assert_eq!(mic.probes(), 1);

        assert!(vc.stop());
        assert_eq!(vc.state(), RecordingState::Idle);
        assert_eq!(rec.stops(), 1);
    }

    #[tokio::test]
    async fn test_start_while_recording_is_noop() {
        let rec = Arc::new(MockRecognizer::new());
        let mic = Arc::new(MockMicrophone::granted());
        let vc = controller(rec.clone(), mic.clone());

        vc.start(true).await.unwrap();
        assert!(!vc.start(true).await.unwrap());
        assert_eq!(rec.starts().len(), 1);
        assert_eq!(mic.probes(), 1);
    }

    #[tokio::test]
    async fn test_disabled_gate_checked_first() {
        let rec = Arc::new(MockRecognizer::unsupported());
        let mic = Arc::new(MockMicrophone::granted());
        let vc = controller(rec, mic.clone());

        let err = vc.start(false).await.unwrap_err();
        assert!(matches!(err, VoiceInputError::Disabled));
        assert_eq!(mic.probes(), 0);
    }

    #[tokio::test]
    async fn test_unsupported_never_probes() {
        let rec = Arc::new(MockRecognizer::unsupported());
        let mic = Arc::new(MockMicrophone::granted());
        let vc = controller(rec, mic.clone());

        let err = vc.start(true).await.unwrap_err();
        assert!(matches!(err, VoiceInputError::Unsupported));
        assert_eq!(mic.probes(), 0);
        assert_eq!(vc.state(), RecordingState::Idle);
    }

    #[tokio::test]
    async fn test_probe_failure_stays_idle() {
        let rec = Arc::new(MockRecognizer::new());
        let mic = Arc::new(MockMicrophone::failing(MicrophoneError::Denied));
        let vc = controller(rec.clone(), mic);

        let err = vc.start(true).await.unwrap_err();
        assert!(matches!(
            err,
            VoiceInputError::Microphone(MicrophoneError::Denied)
        ));
        assert_eq!(vc.state(), RecordingState::Idle);
        assert!(rec.starts().is_empty());
    }

    #[tokio::test]
    async fn test_recognizer_start_failure_resets() {
        let rec = Arc::new(MockRecognizer::failing_start("already started"));
        let mic = Arc::new(MockMicrophone::granted());
        let vc = controller(rec, mic);

        let err = vc.start(true).await.unwrap_err();
        assert!(matches!(err, VoiceInputError::Recognizer(_)));
        assert_eq!(vc.state(), RecordingState::Idle);
    }

    #[tokio::test]
    async fn test_stop_without_end_event_reaches_idle() {
        let rec = Arc::new(MockRecognizer::new());
        let vc = controller(rec, Arc::new(MockMicrophone::granted()));
        vc.start(true).await.unwrap();

        // The recognizer never reports End.
        vc.stop();
        assert_eq!(vc.state(), RecordingState::Idle);
        assert!(!vc.stop());
    }

    #[tokio::test]
    async fn test_toggle_round_trip() {
        let rec = Arc::new(MockRecognizer::new());
        let vc = controller(rec, Arc::new(MockMicrophone::granted()));
        assert_eq!(vc.toggle(true).await.unwrap(), RecordingState::Recording);
        assert_eq!(vc.toggle(true).await.unwrap(), RecordingState::Idle);
    }

    #[tokio::test]
    async fn test_uses_current_locale() {
        let rec = Arc::new(MockRecognizer::new());
        let vc = controller(rec.clone(), Arc::new(MockMicrophone::granted()));
        vc.set_locale("mr-IN");
        vc.start(true).await.unwrap();
        assert_eq!(rec.starts(), vec!["mr-IN".to_string()]);
    }

    #[tokio::test]
    async fn test_only_final_results_kept() {
        let vc = controller(
            Arc::new(MockRecognizer::new()),
            Arc::new(MockMicrophone::granted()),
        );
        vc.start(true).await.unwrap();

        let outcome = vc.handle_event(RecognizerEvent::Results(vec![
            RecognitionResult::interim("my cow"),
        ]));
        assert_eq!(outcome, RecognizerOutcome::Nothing);

        let outcome = vc.handle_event(RecognizerEvent::Results(vec![
            RecognitionResult::final_(" my cow "),
            RecognitionResult::interim("is"),
            RecognitionResult::final_("is limping "),
        ]));
        assert_eq!(
            outcome,
            RecognizerOutcome::Transcript("my cow is limping".to_string())
        );
        assert!(vc.is_recording());
    }

    #[tokio::test]
    async fn test_error_and_end_return_to_idle() {
        let vc = controller(
            Arc::new(MockRecognizer::new()),
            Arc::new(MockMicrophone::granted()),
        );
        vc.start(true).await.unwrap();
        let outcome = vc.handle_event(RecognizerEvent::Error(RecognitionErrorKind::NoSpeech));
        assert_eq!(
            outcome,
            RecognizerOutcome::Failed(RecognitionErrorKind::NoSpeech)
        );
        assert_eq!(vc.state(), RecordingState::Idle);

        vc.start(true).await.unwrap();
        assert_eq!(vc.handle_event(RecognizerEvent::End), RecognizerOutcome::Ended);
        assert_eq!(vc.state(), RecordingState::Idle);
    }
}
