//! Remote chat service contract.
//!
//! Request and response shapes of the veterinary web application's chat and
//! auth endpoints. Every response field is optional on the wire; missing
//! fields take their defaults so partial or error payloads still decode.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::upload::UploadFile;

/// Failure to obtain a usable response from the chat service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No response at all: connection refused, DNS, timeout.
    #[error("{0}")]
    Transport(String),

    /// A 2xx response whose body was not the expected JSON.
    #[error("invalid response: {0}")]
    Decode(String),

    /// A non-2xx response whose body was not the expected JSON.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

// =============================================================================
// Chat
// =============================================================================

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub language: String,
    pub session_key: String,
}

/// Reply to a chat message or file upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatReply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    /// Key the server filed the exchange under; may differ from the one sent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Degraded answer supplied alongside a business-level failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_response: Option<String>,
    /// Upload replies only, e.g. `image_analysis`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_fallback: bool,
}

impl ChatReply {
    /// A successful reply carrying `response`.
    pub fn ok(response: impl Into<String>) -> Self {
        Self {
            success: true,
            response: Some(response.into()),
            ..Self::default()
        }
    }

    /// A failed reply with an optional error text and fallback answer.
    pub fn failed(error: Option<&str>, fallback: Option<&str>) -> Self {
        Self {
            success: false,
            error: error.map(str::to_string),
            fallback_response: fallback.map(str::to_string),
            ..Self::default()
        }
    }
}

/// A file upload for `POST /api/chat/upload`.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file: UploadFile,
    pub language: String,
    pub question: String,
}

/// Acknowledgement of `POST /api/chat/clear`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ack {
    pub success: bool,
    pub message: Option<String>,
    pub error: Option<String>,
    pub session_key: Option<String>,
}

// =============================================================================
// Catalog, sessions, history, health
// =============================================================================

/// `GET /api/chat/languages`: language code to display name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguagesResponse {
    pub success: bool,
    pub languages: BTreeMap<String, String>,
    pub error: Option<String>,
}

/// One server-side conversation.
///
/// Times are kept as the server sends them; they may lack a UTC offset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSummary {
    pub session_key: String,
    pub last_message_time: Option<String>,
    pub first_message_time: Option<String>,
    pub message_count: u64,
    pub preview: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionsResponse {
    pub success: bool,
    pub sessions: Vec<SessionSummary>,
    pub error: Option<String>,
}

/// One question/answer pair stored by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryEntry {
    pub id: String,
    pub message: String,
    pub response: String,
    pub timestamp: Option<String>,
    pub language: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryResponse {
    pub success: bool,
    pub history: Vec<HistoryEntry>,
    pub session_key: Option<String>,
    pub error: Option<String>,
}

/// `GET /api/chat/health`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthResponse {
    pub success: bool,
    pub healthy: bool,
    pub services: BTreeMap<String, serde_json::Value>,
    pub message: Option<String>,
    pub status: Option<String>,
}

// =============================================================================
// Auth
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthResponse {
    pub success: bool,
    pub redirect: Option<String>,
    pub message: Option<String>,
}

// =============================================================================
// Trait
// =============================================================================

/// The remote chat collaborator.
///
/// Implementations return `Ok` for any response whose body decodes, even
/// with `success: false`; business failures are the caller's to interpret.
#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError>;

    async fn upload(&self, request: &UploadRequest) -> Result<ChatReply, ApiError>;

    /// Invalidate server-side history for `session_key`.
    async fn clear(&self, session_key: &str) -> Result<Ack, ApiError>;

    async fn languages(&self) -> Result<LanguagesResponse, ApiError>;

    async fn sessions(&self) -> Result<SessionsResponse, ApiError>;

    async fn history(&self, session_key: &str) -> Result<HistoryResponse, ApiError>;

    async fn health(&self) -> Result<HealthResponse, ApiError>;

    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError>;

    async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse, ApiError>;
}

// =============================================================================
// Tests
// =============================================================================
