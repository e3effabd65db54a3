//! In-memory synthesis engine for tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use vetassist_core::types::Voice;

use crate::error::SpeechOutputError;
use crate::synthesis::{SpeechOutput, Utterance};

/// Records every utterance; rejects those in configured locales.
#[derive(Debug)]
pub struct MockSynthesizer {
    voices: Vec<Voice>,
    failing: HashSet<String>,
    spoken: Mutex<Vec<Utterance>>,
    cancels: AtomicUsize,
    speaking: AtomicBool,
    paused: AtomicBool,
}

impl MockSynthesizer {
    pub fn new(voices: Vec<Voice>) -> Self {
        Self {
            voices,
            failing: HashSet::new(),
            spoken: Mutex::new(Vec::new()),
            cancels: AtomicUsize::new(0),
            speaking: AtomicBool::new(false),
            paused: AtomicBool::new(false),
        }
    }

    /// Reject utterances whose lang is `locale`.
    pub fn failing_locale(mut self, locale: &str) -> Self {
        self.failing.insert(locale.to_string());
        self
    }

    /// Every utterance passed to `speak`, accepted or not.
    pub fn spoken(&self) -> Vec<Utterance> {
        self.spoken.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn cancels(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }
}

impl SpeechOutput for MockSynthesizer {
    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
        self.speaking.store(false, Ordering::SeqCst);
        self.paused.store(false, Ordering::SeqCst);
    }

    fn speak(&self, utterance: &Utterance) -> Result<(), SpeechOutputError> {
        self.spoken
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(utterance.clone());
        if self.failing.contains(&utterance.lang) {
            return Err(SpeechOutputError::Engine("synthesis-failed".to_string()));
        }
        self.speaking.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }
}
