//! Scriptable chat service for tests.
//!
//! Replies are queued per endpoint and consumed in order; an empty queue
//! yields a plain success. Every request is recorded.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::api::{
    Ack, ApiError, AuthResponse, ChatApi, ChatReply, ChatRequest, HealthResponse, HistoryResponse,
    LanguagesResponse, SessionsResponse, SignupRequest, UploadRequest,
};

/// One recorded upload, without the file bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpload {
    pub file_name: String,
    pub mime_type: String,
    pub size: u64,
    pub language: String,
    pub question: String,
}

#[derive(Debug, Default)]
pub struct MockChatApi {
    chat_replies: Mutex<VecDeque<Result<ChatReply, ApiError>>>,
    upload_replies: Mutex<VecDeque<Result<ChatReply, ApiError>>>,
    clear_replies: Mutex<VecDeque<Result<Ack, ApiError>>>,
    languages: Mutex<Option<Result<LanguagesResponse, ApiError>>>,
    sessions: Mutex<Option<Result<SessionsResponse, ApiError>>>,
    history: Mutex<Option<Result<HistoryResponse, ApiError>>>,
    health: Mutex<Option<Result<HealthResponse, ApiError>>>,
    chat_requests: Mutex<Vec<ChatRequest>>,
    uploads: Mutex<Vec<RecordedUpload>>,
    clears: Mutex<Vec<String>>,
    chat_gate: Mutex<Option<Arc<Notify>>>,
    calls: AtomicUsize,
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl MockChatApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_chat(&self, reply: Result<ChatReply, ApiError>) {
        lock(&self.chat_replies).push_back(reply);
    }

    pub fn push_upload(&self, reply: Result<ChatReply, ApiError>) {
        lock(&self.upload_replies).push_back(reply);
    }

    pub fn push_clear(&self, reply: Result<Ack, ApiError>) {
        lock(&self.clear_replies).push_back(reply);
    }

    pub fn set_languages(&self, response: Result<LanguagesResponse, ApiError>) {
        *lock(&self.languages) = Some(response);
    }

    pub fn set_sessions(&self, response: Result<SessionsResponse, ApiError>) {
        *lock(&self.sessions) = Some(response);
    }

    pub fn set_history(&self, response: Result<HistoryResponse, ApiError>) {
        *lock(&self.history) = Some(response);
    }

    pub fn set_health(&self, response: Result<HealthResponse, ApiError>) {
        *lock(&self.health) = Some(response);
    }

    /// Make every later `chat` call wait for one `notify_one` on the
    /// returned handle before replying.
    pub fn hold_chat(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *lock(&self.chat_gate) = Some(gate.clone());
        gate
    }

    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        lock(&self.chat_requests).clone()
    }

    pub fn uploads(&self) -> Vec<RecordedUpload> {
        lock(&self.uploads).clone()
    }

    pub fn clears(&self) -> Vec<String> {
        lock(&self.clears).clone()
    }

    /// Total number of calls on any endpoint.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn count(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChatApi for MockChatApi {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError> {
        self.count();
        lock(&self.chat_requests).push(request.clone());
        let gate = lock(&self.chat_gate).clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        lock(&self.chat_replies)
            .pop_front()
            .unwrap_or_else(|| Ok(ChatReply::ok("mock reply")))
    }

    async fn upload(&self, request: &UploadRequest) -> Result<ChatReply, ApiError> {
        self.count();
        lock(&self.uploads).push(RecordedUpload {
            file_name: request.file.name.clone(),
            mime_type: request.file.mime_type.clone(),
            size: request.file.size,
            language: request.language.clone(),
            question: request.question.clone(),
        });
        lock(&self.upload_replies)
            .pop_front()
            .unwrap_or_else(|| Ok(ChatReply::ok("mock analysis")))
    }

    async fn clear(&self, session_key: &str) -> Result<Ack, ApiError> {
        self.count();
        lock(&self.clears).push(session_key.to_string());
        lock(&self.clear_replies).pop_front().unwrap_or_else(|| {
            Ok(Ack {
                success: true,
                ..Ack::default()
            })
        })
    }

    async fn languages(&self) -> Result<LanguagesResponse, ApiError> {
        self.count();
        lock(&self.languages)
            .clone()
            .unwrap_or_else(|| Ok(LanguagesResponse::default()))
    }

    async fn sessions(&self) -> Result<SessionsResponse, ApiError> {
        self.count();
        lock(&self.sessions)
            .clone()
            .unwrap_or_else(|| Ok(SessionsResponse::default()))
    }

    async fn history(&self, _session_key: &str) -> Result<HistoryResponse, ApiError> {
        self.count();
        lock(&self.history)
            .clone()
            .unwrap_or_else(|| Ok(HistoryResponse::default()))
    }

    async fn health(&self) -> Result<HealthResponse, ApiError> {
        self.count();
        lock(&self.health).clone().unwrap_or_else(|| {
            Ok(HealthResponse {
                success: true,
                healthy: true,
                ..HealthResponse::default()
            })
        })
    }

    async fn login(&self, _email: &str, _password: &str) -> Result<AuthResponse, ApiError> {
        self.count();
        Ok(AuthResponse {
            success: true,
            redirect: Some("/dashboard".to_string()),
            message: None,
        })
    }

    async fn signup(&self, _request: &SignupRequest) -> Result<AuthResponse, ApiError> {
        self.count();
        Ok(AuthResponse {
            success: true,
            redirect: Some("/dashboard".to_string()),
            message: None,
        })
    }
}
