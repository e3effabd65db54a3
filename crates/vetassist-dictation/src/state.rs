//! Recording state machine with thread-safe transitions.
//!
//! Valid transitions:
//! - Idle -> Recording (recognizer started)
//! - Recording -> Idle (end, error, or explicit stop)

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::VoiceInputError;

/// Operational state of voice input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordingState {
    /// No recognizer running. Ready to start.
    Idle,
    /// The platform recognizer is capturing speech.
    Recording,
}

impl fmt::Display for RecordingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordingState::Idle => write!(f, "Idle"),
            RecordingState::Recording => write!(f, "Recording"),
        }
    }
}

impl RecordingState {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &RecordingState) -> bool {
        matches!(
            (self, target),
            (RecordingState::Idle, RecordingState::Recording)
                | (RecordingState::Recording, RecordingState::Idle)
        )
    }
}

/// Shared recording state. Clones observe the same state.
#[derive(Debug, Clone)]
pub struct StateMachine {
    state: Arc<Mutex<RecordingState>>,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    /// Create a new state machine initialized to `Idle`.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(RecordingState::Idle)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RecordingState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns the current state.
    pub fn current(&self) -> RecordingState {
        *self.lock()
    }

    /// Attempt to transition to the target state.
    pub fn transition(&self, target: RecordingState) -> Result<(), VoiceInputError> {
        let mut state = self.lock();
        if state.can_transition_to(&target) {
            tracing::debug!("Recording state: {} -> {}", *state, target);
            *state = target;
            Ok(())
        } else {
            Err(VoiceInputError::InvalidTransition(*state, target))
        }
    }

    /// Force the state back to Idle. Returns the state it was in.
    pub fn reset(&self) -> RecordingState {
        let mut state = self.lock();
        let previous = *state;
        if previous != RecordingState::Idle {
            tracing::debug!("Recording state reset to Idle from {}", previous);
        }
        *state = RecordingState::Idle;
        previous
    }
}

// =============================================================================
// Tests
// =============================================================================
