//! `reqwest` implementation of [`ChatApi`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

use vetassist_core::config::ServerConfig;

use crate::api::{
    Ack, ApiError, AuthResponse, ChatApi, ChatReply, ChatRequest, HealthResponse, HistoryResponse,
    LanguagesResponse, LoginRequest, SessionsResponse, SignupRequest, UploadRequest,
};

/// Longest error body kept in [`ApiError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// HTTP client for the veterinary web application.
///
/// Keeps a cookie store so the server's login session carries over to the
/// chat endpoints.
#[derive(Debug, Clone)]
pub struct HttpChatApi {
    client: Client,
    base_url: String,
}

impl HttpChatApi {
    pub fn new(config: &ServerConfig) -> Result<Self, ApiError> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .user_agent(config.user_agent.clone());
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<T>(&body) {
            Ok(value) => {
                if !status.is_success() {
                    debug!(status = status.as_u16(), "Non-success status with JSON body");
                }
                Ok(value)
            }
            Err(e) if status.is_success() => Err(ApiError::Decode(e.to_string())),
            Err(_) => {
                warn!(status = status.as_u16(), "Server returned non-JSON error");
                Err(ApiError::Status {
                    status: status.as_u16(),
                    body: truncate(body, MAX_ERROR_BODY),
                })
            }
        }
    }
}

fn truncate(mut body: String, max: usize) -> String {
    if body.len() > max {
        let mut cut = max;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    body
}

#[async_trait]
impl ChatApi for HttpChatApi {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError> {
        debug!(session_key = %request.session_key, language = %request.language, "POST /api/chat");
        self.send(self.client.post(self.url("/api/chat")).json(request))
            .await
    }

    async fn upload(&self, request: &UploadRequest) -> Result<ChatReply, ApiError> {
        let file = &request.file;
        debug!(file = %file.name, size = file.size, mime = %file.mime_type, "POST /api/chat/upload");

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)?;
        let form = Form::new()
            .part("file", part)
            .text("language", request.language.clone())
            .text("question", request.question.clone());

        self.send(self.client.post(self.url("/api/chat/upload")).multipart(form))
            .await
    }

    async fn clear(&self, session_key: &str) -> Result<Ack, ApiError> {
        self.send(
            self.client
                .post(self.url("/api/chat/clear"))
                .json(&json!({ "session_key": session_key })),
        )
        .await
    }

    async fn languages(&self) -> Result<LanguagesResponse, ApiError> {
        self.send(self.client.get(self.url("/api/chat/languages")))
            .await
    }

    async fn sessions(&self) -> Result<SessionsResponse, ApiError> {
        self.send(self.client.get(self.url("/api/chat/sessions")))
            .await
    }

    async fn history(&self, session_key: &str) -> Result<HistoryResponse, ApiError> {
        self.send(
            self.client
                .get(self.url("/api/chat/history"))
                .query(&[("session_key", session_key)]),
        )
        .await
    }

    async fn health(&self) -> Result<HealthResponse, ApiError> {
        self.send(self.client.get(self.url("/api/chat/health")))
            .await
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.send(self.client.post(self.url("/auth/login")).json(&body))
            .await
    }

    async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse, ApiError> {
        self.send(self.client.post(self.url("/auth/signup")).json(request))
            .await
    }
}
