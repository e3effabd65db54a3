//! VetAssist Chat crate - the message exchange orchestrator.
//!
//! Wires the session store, voice input, voice output, and the remote chat
//! service together behind [`ChatController`], a UI-agnostic command
//! interface that publishes every visible effect as a
//! [`ChatEvent`](vetassist_core::ChatEvent).

pub mod api;
pub mod controller;
pub mod error;
pub mod http;
pub mod mock;
pub mod quick;
pub mod upload;

pub use api::{ApiError, ChatApi, ChatReply, HealthResponse, SessionSummary};
pub use controller::{ChatController, SendOutcome};
pub use error::ChatError;
pub use http::HttpChatApi;
pub use quick::QuickAction;
pub use upload::{format_file_size, UploadFile};
