use thiserror::Error;

/// Top-level error type for the VetAssist client.
///
/// Subsystem crates define their own error enums and convert to or from
/// `VetAssistError` so `?` works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VetAssistError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Speech error: {0}")]
    Speech(String),
}

impl From<toml::de::Error> for VetAssistError {
    fn from(err: toml::de::Error) -> Self {
        VetAssistError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for VetAssistError {
    fn from(err: toml::ser::Error) -> Self {
        VetAssistError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for VetAssistError {
    fn from(err: serde_json::Error) -> Self {
        VetAssistError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for VetAssist operations.
pub type Result<T> = std::result::Result<T, VetAssistError>;
