//! Scriptable recognizer and microphone for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::capability::{MicrophoneProbe, SpeechInput};
use crate::error::{MicrophoneError, VoiceInputError};

/// Recognizer that records calls instead of listening.
#[derive(Debug)]
pub struct MockRecognizer {
    supported: bool,
    start_error: Option<String>,
    starts: Mutex<Vec<String>>,
    stops: AtomicUsize,
}

impl Default for MockRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRecognizer {
    pub fn new() -> Self {
        Self {
            supported: true,
            start_error: None,
            starts: Mutex::new(Vec::new()),
            stops: AtomicUsize::new(0),
        }
    }

    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new()
        }
    }

    pub fn failing_start(message: impl Into<String>) -> Self {
        Self {
            start_error: Some(message.into()),
            ..Self::new()
        }
    }

    /// Locales passed to every `start` call, in order.
    pub fn starts(&self) -> Vec<String> {
        self.starts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl SpeechInput for MockRecognizer {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn start(&self, locale: &str) -> Result<(), VoiceInputError> {
        if let Some(message) = &self.start_error {
            return Err(VoiceInputError::Recognizer(message.clone()));
        }
        self.starts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(locale.to_string());
        Ok(())
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Microphone probe with a fixed answer.
#[derive(Debug)]
pub struct MockMicrophone {
    result: Result<(), MicrophoneError>,
    probes: AtomicUsize,
}

impl MockMicrophone {
    pub fn granted() -> Self {
        Self {
            result: Ok(()),
            probes: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: MicrophoneError) -> Self {
        Self {
            result: Err(error),
            probes: AtomicUsize::new(0),
        }
    }

    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MicrophoneProbe for MockMicrophone {
    async fn probe(&self) -> Result<(), MicrophoneError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}
