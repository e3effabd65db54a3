//! Wire tests for `HttpChatApi` against a local mock server.

use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vetassist_chat::api::{ApiError, ChatApi, ChatRequest, SignupRequest, UploadRequest};
use vetassist_chat::{HttpChatApi, UploadFile};
use vetassist_core::config::ServerConfig;

fn client(server: &MockServer) -> HttpChatApi {
    let config = ServerConfig {
        base_url: format!("{}/", server.uri()),
        request_timeout_secs: Some(5),
        ..ServerConfig::default()
    };
    HttpChatApi::new(&config).unwrap_or_else(|e| panic!("client build failed: {e}"))
}

// ── Chat ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_chat_posts_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(json!({
            "message": "hello",
            "language": "hi",
            "session_key": "chat_1_abc"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "response": "नमस्ते!",
            "session_key": "chat_1_abc"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server);
    let reply = api
        .chat(&ChatRequest {
            message: "hello".to_string(),
            language: "hi".to_string(),
            session_key: "chat_1_abc".to_string(),
        })
        .await
        .unwrap();
    assert!(reply.success);
    assert_eq!(reply.response.as_deref(), Some("नमस्ते!"));
    assert_eq!(reply.session_key.as_deref(), Some("chat_1_abc"));
}

#[tokio::test]
async fn test_json_error_status_still_decodes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false,
            "error": "Please log in to use the chatbot"
        })))
        .mount(&server)
        .await;

    let reply = client(&server)
        .chat(&ChatRequest {
            message: "hi".to_string(),
            language: "en".to_string(),
            session_key: "k".to_string(),
        })
        .await
        .unwrap();
    assert!(!reply.success);
    assert_eq!(reply.error.as_deref(), Some("Please log in to use the chatbot"));
}

#[tokio::test]
async fn test_non_json_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/chat/health"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = client(&server).health().await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Status {
            status: 502,
            body: "Bad Gateway".to_string()
        }
    );
}

#[tokio::test]
async fn test_non_json_success_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/chat/languages"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let err = client(&server).languages().await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // A port that was just free; nothing listens on it once the listener drops.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ServerConfig {
        base_url: format!("http://{addr}"),
        request_timeout_secs: Some(2),
        ..ServerConfig::default()
    };
    let api = HttpChatApi::new(&config).unwrap();
    let err = api.health().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "got {err:?}");
}

// ── Upload ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_upload_sends_multipart_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat/upload"))
        .and(header_exists("content-type"))
        .and(body_string_contains("name=\"file\"; filename=\"goat.png\""))
        .and(body_string_contains("name=\"language\""))
        .and(body_string_contains("name=\"question\""))
        .and(body_string_contains("Please analyze this file"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "response": "Healthy coat.",
            "type": "image_analysis"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = UploadRequest {
        file: UploadFile::new("goat.png", b"fakepng".to_vec()),
        language: "en".to_string(),
        question: "Please analyze this file".to_string(),
    };
    let reply = client(&server).upload(&request).await.unwrap();
    assert_eq!(reply.kind.as_deref(), Some("image_analysis"));
    assert_eq!(reply.response.as_deref(), Some("Healthy coat."));
}

// ── Sessions, history, clear ──────────────────────────────────────

#[tokio::test]
async fn test_clear_posts_session_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat/clear"))
        .and(body_json(json!({ "session_key": "chat_1_abc" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Cleared 4 messages",
            "session_key": "chat_1_abc"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ack = client(&server).clear("chat_1_abc").await.unwrap();
    assert!(ack.success);
    assert_eq!(ack.message.as_deref(), Some("Cleared 4 messages"));
}

#[tokio::test]
async fn test_history_uses_query_parameter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/chat/history"))
        .and(query_param("session_key", "chat_1_abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "session_key": "chat_1_abc",
            "history": [{
                "id": "65f0",
                "message": "Goat coughing",
                "response": "Check for lungworm.",
                "timestamp": "2024-03-01T10:15:30.123456",
                "language": "en",
                "type": "text"
            }]
        })))
        .mount(&server)
        .await;

    let resp = client(&server).history("chat_1_abc").await.unwrap();
    assert_eq!(resp.history.len(), 1);
    assert_eq!(resp.history[0].response, "Check for lungworm.");
}

#[tokio::test]
async fn test_sessions_and_languages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/chat/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "sessions": [{"session_key": "chat_2_x", "message_count": 2, "preview": "Hi"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/chat/languages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "languages": {"en": "English", "mr": "मराठी"}
        })))
        .mount(&server)
        .await;

    let api = client(&server);
    let sessions = api.sessions().await.unwrap();
    assert_eq!(sessions.sessions[0].session_key, "chat_2_x");
    let languages = api.languages().await.unwrap();
    assert_eq!(languages.languages.get("mr").map(String::as_str), Some("मराठी"));
}

// ── Auth ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_cookie_is_kept_for_chat() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({ "email": "vet@example.com", "password": "pw" })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "session=abc123; Path=/")
                .set_body_json(json!({ "success": true, "redirect": "/dashboard" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/chat/health"))
        .and(wiremock::matchers::header("cookie", "session=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "healthy": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server);
    let auth = api.login("vet@example.com", "pw").await.unwrap();
    assert!(auth.success);
    assert_eq!(auth.redirect.as_deref(), Some("/dashboard"));

    let health = api.health().await.unwrap();
    assert!(health.healthy);
}

#[tokio::test]
async fn test_signup_failure_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/signup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "Email already registered"
        })))
        .mount(&server)
        .await;

    let resp = client(&server)
        .signup(&SignupRequest {
            name: "Ravi".to_string(),
            email: "ravi@example.com".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
        })
        .await
        .unwrap();
    assert!(!resp.success);
    assert_eq!(resp.message.as_deref(), Some("Email already registered"));
}
