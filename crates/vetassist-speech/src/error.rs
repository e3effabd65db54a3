//! Error types for voice output.

use vetassist_core::error::VetAssistError;

/// Errors reported by a synthesis engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpeechOutputError {
    #[error("Speech synthesis not supported on this platform")]
    Unsupported,
    #[error("Synthesis failed: {0}")]
    Engine(String),
}

impl From<SpeechOutputError> for VetAssistError {
    fn from(err: SpeechOutputError) -> Self {
        VetAssistError::Speech(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            SpeechOutputError::Engine("synthesis-failed".to_string()).to_string(),
            "Synthesis failed: synthesis-failed"
        );
    }

    #[test]
    fn test_into_core_error() {
        let err: VetAssistError = SpeechOutputError::Unsupported.into();
        assert!(matches!(err, VetAssistError::Speech(_)));
    }
}
