//! Error types for the chat orchestrator.

use thiserror::Error;

use vetassist_core::error::VetAssistError;
use vetassist_dictation::VoiceInputError;

use crate::api::ApiError;
use crate::upload::format_file_size;

/// `format_file_size` without the space, as in "16MB".
fn compact_size(bytes: &u64) -> String {
    format_file_size(*bytes).replace(' ', "")
}

/// Errors from chat commands.
///
/// Most command failures are also reported to the UI as notifications;
/// the error value is for callers that need to branch on the cause.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("no active session")]
    NoActiveSession,

    #[error("File too large. Maximum size is {}.", compact_size(.max))]
    FileTooLarge { size: u64, max: u64 },

    #[error("Unsupported file type. Please upload images or PDF files.")]
    UnsupportedFileType(String),

    #[error("unknown quick action: {0}")]
    UnknownQuickAction(String),

    #[error("server error: {0}")]
    Remote(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Voice(#[from] VoiceInputError),

    #[error(transparent)]
    Storage(#[from] VetAssistError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ChatError> for VetAssistError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Storage(e) => e,
            ChatError::Io(e) => VetAssistError::Io(e),
            ChatError::Api(e) => VetAssistError::Network(e.to_string()),
            ChatError::Voice(e) => e.into(),
            other => VetAssistError::Config(other.to_string()),
        }
    }
}
