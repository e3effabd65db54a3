//! End-to-end controller scenarios against a scripted chat service.

use std::sync::Arc;

use tokio::sync::broadcast;

use vetassist_chat::api::{Ack, ApiError, ChatReply};
use vetassist_chat::mock::MockChatApi;
use vetassist_chat::{ChatController, ChatError, SendOutcome, UploadFile};
use vetassist_core::config::ChatConfig;
use vetassist_core::events::{ChatEvent, NotificationLevel};
use vetassist_core::types::Sender;
use vetassist_storage::{keys, KeyValueStore, MemoryStore, SessionStore, SqliteStore};

const MIB: u64 = 1024 * 1024;

fn setup(config: ChatConfig) -> (Arc<MockChatApi>, Arc<MemoryStore>, Arc<ChatController>) {
    let api = Arc::new(MockChatApi::new());
    let kv = Arc::new(MemoryStore::new());
    let controller = Arc::new(ChatController::new(api.clone(), kv.clone(), config));
    controller.restore();
    (api, kv, controller)
}

fn drain(rx: &mut broadcast::Receiver<ChatEvent>) -> Vec<ChatEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn error_notifications(events: &[ChatEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            ChatEvent::Notification {
                level: NotificationLevel::Error,
                text,
            } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

// =============================================================================
// Send
// =============================================================================

#[tokio::test]
async fn test_first_message_creates_session_and_stores_exchange() {
    let (api, kv, controller) = setup(ChatConfig::default());
    assert!(controller.current_session_key().is_none());
    api.push_chat(Ok(ChatReply::ok("hi!")));

    let outcome = controller.send("hello").await;
    assert_eq!(outcome, SendOutcome::Replied);

    let key = controller.current_session_key().expect("session created");
    let requests = api.chat_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].message, "hello");
    assert_eq!(requests[0].session_key, key.as_str());
    assert_eq!(requests[0].language, "en");

    let messages = controller.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].sender, Sender::User);
    assert_eq!(messages[0].text, "hello");
    assert_eq!(messages[1].sender, Sender::Bot);
    assert_eq!(messages[1].text, "hi!");

    // Persisted state replays to the same list.
    let replayed = SessionStore::restore(kv.clone());
    assert_eq!(replayed.current_key(), Some(&key));
    assert_eq!(replayed.current_messages(), messages.as_slice());
}

#[tokio::test]
async fn test_transport_failure_stores_one_error_message() {
    let (api, _kv, controller) = setup(ChatConfig::default());
    let mut rx = controller.subscribe();
    api.push_chat(Err(ApiError::Transport("connection refused".to_string())));

    let outcome = controller.send("is my cow ok?").await;
    assert_eq!(outcome, SendOutcome::TransportError);

    let messages = controller.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].text, "is my cow ok?");
    assert_eq!(messages[1].sender, Sender::Bot);
    assert_eq!(
        messages[1].text,
        "❌ Unable to connect to the server. Please check your internet connection and try again."
    );

    let events = drain(&mut rx);
    assert_eq!(
        error_notifications(&events),
        vec!["Connection failed: connection refused".to_string()]
    );
    // Typing indicator is always removed.
    assert!(events.iter().any(|e| matches!(e, ChatEvent::TypingStopped)));
}

#[tokio::test]
async fn test_each_send_is_a_single_request() {
    let (api, _kv, controller) = setup(ChatConfig::default());
    api.push_chat(Err(ApiError::Transport("timeout".to_string())));
    controller.send("one").await;
    controller.send("two").await;
    assert_eq!(api.chat_requests().len(), 2);
    assert_eq!(controller.messages().len(), 4);
}

// =============================================================================
// Upload
// =============================================================================

#[tokio::test]
async fn test_oversized_upload_rejected_before_network() {
    let (api, _kv, controller) = setup(ChatConfig::default());
    let mut rx = controller.subscribe();

    let file = UploadFile::new("udder.png", vec![0u8; (20 * MIB) as usize]);
    let err = controller.upload(file).await.unwrap_err();
    assert!(matches!(err, ChatError::FileTooLarge { size, .. } if size == 20 * MIB));

    assert_eq!(api.calls(), 0);
    assert!(api.uploads().is_empty());
    assert!(controller.messages().is_empty());
    assert_eq!(
        error_notifications(&drain(&mut rx)),
        vec!["File too large. Maximum size is 16MB.".to_string()]
    );
}

#[tokio::test]
async fn test_oversized_upload_from_disk_is_not_read() {
    let (api, _kv, controller) = setup(ChatConfig::default());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scan.pdf");
    std::fs::File::create(&path)
        .unwrap()
        .set_len(20 * MIB)
        .unwrap();

    let err = controller.upload_path(&path).await.unwrap_err();
    assert!(matches!(err, ChatError::FileTooLarge { .. }));
    assert_eq!(api.calls(), 0);
}

#[tokio::test]
async fn test_upload_from_disk() {
    let (api, _kv, controller) = setup(ChatConfig::default());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("eye.webp");
    std::fs::write(&path, vec![7u8; 1536]).unwrap();

    let outcome = controller.upload_path(&path).await.unwrap();
    assert_eq!(outcome, SendOutcome::Replied);
    assert_eq!(api.uploads()[0].file_name, "eye.webp");
    assert_eq!(api.uploads()[0].mime_type, "image/webp");
    assert_eq!(
        controller.messages()[0].text,
        "📎 Uploaded file: eye.webp (1.5 KB)"
    );
}

// =============================================================================
// Clear
// =============================================================================

#[tokio::test]
async fn test_clear_failure_keeps_local_history() {
    let (api, kv, controller) = setup(ChatConfig::default());
    controller.send("hello").await;
    let key = controller.current_session_key().unwrap();
    let before = kv.get(keys::SESSIONS).unwrap();

    api.push_clear(Ok(Ack {
        success: false,
        error: Some("Failed to clear conversation from database".to_string()),
        ..Ack::default()
    }));
    assert!(matches!(
        controller.clear_session().await,
        Err(ChatError::Remote(_))
    ));
    assert_eq!(controller.messages().len(), 2);
    assert_eq!(kv.get(keys::SESSIONS).unwrap(), before);

    api.push_clear(Err(ApiError::Transport("down".to_string())));
    assert!(matches!(
        controller.clear_session().await,
        Err(ChatError::Api(_))
    ));
    assert_eq!(controller.messages().len(), 2);
    assert_eq!(api.clears(), vec![key.to_string(), key.to_string()]);
}

#[tokio::test]
async fn test_clear_success_removes_local_history() {
    let (api, kv, controller) = setup(ChatConfig::default());
    let mut rx = controller.subscribe();
    controller.send("hello").await;
    let key = controller.current_session_key().unwrap();

    controller.clear_session().await.unwrap();
    assert_eq!(api.clears(), vec![key.to_string()]);
    assert!(controller.messages().is_empty());

    let replayed = SessionStore::restore(kv.clone());
    assert!(!replayed.contains(&key));

    let events = drain(&mut rx);
    assert!(events.iter().any(
        |e| matches!(e, ChatEvent::HistoryCleared { session_key } if session_key == &key)
    ));
}

// =============================================================================
// Sessions
// =============================================================================

#[tokio::test]
async fn test_new_session_is_distinct_and_empty() {
    let (_api, _kv, controller) = setup(ChatConfig::default());
    controller.send("hello").await;
    let first = controller.current_session_key().unwrap();

    let second = controller.new_session();
    assert_ne!(first, second);
    assert!(controller.messages().is_empty());

    let third = controller.new_session();
    assert_ne!(second, third);
}

#[tokio::test]
async fn test_stale_reply_follows_current_session_by_default() {
    let (api, _kv, controller) = setup(ChatConfig::default());
    let gate = api.hold_chat();
    api.push_chat(Ok(ChatReply::ok("late answer")));

    let sender = controller.clone();
    let in_flight = tokio::spawn(async move { sender.send("question").await });
    while api.chat_requests().is_empty() {
        tokio::task::yield_now().await;
    }

    let fresh = controller.new_session();
    gate.notify_one();
    assert_eq!(in_flight.await.unwrap(), SendOutcome::Replied);

    assert_eq!(controller.current_session_key(), Some(fresh));
    let messages = controller.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text, "late answer");
}

#[tokio::test]
async fn test_stale_reply_discarded_when_enabled() {
    let config = ChatConfig {
        discard_stale_responses: true,
        ..ChatConfig::default()
    };
    let (api, _kv, controller) = setup(config);
    let gate = api.hold_chat();
    api.push_chat(Ok(ChatReply::ok("late answer")));

    let sender = controller.clone();
    let in_flight = tokio::spawn(async move { sender.send("question").await });
    while api.chat_requests().is_empty() {
        tokio::task::yield_now().await;
    }

    controller.new_session();
    gate.notify_one();
    assert_eq!(in_flight.await.unwrap(), SendOutcome::Discarded);
    assert!(controller.messages().is_empty());
}

#[tokio::test]
async fn test_server_key_ignored_after_session_switch() {
    let (api, _kv, controller) = setup(ChatConfig::default());
    let gate = api.hold_chat();
    let mut reply = ChatReply::ok("answer");
    reply.session_key = Some("chat_999_server".to_string());
    api.push_chat(Ok(reply));

    let sender = controller.clone();
    let in_flight = tokio::spawn(async move { sender.send("question").await });
    while api.chat_requests().is_empty() {
        tokio::task::yield_now().await;
    }
    let fresh = controller.new_session();
    gate.notify_one();
    in_flight.await.unwrap();

    assert_eq!(controller.current_session_key(), Some(fresh));
}

// =============================================================================
// Persistence backend
// =============================================================================

#[tokio::test]
async fn test_history_survives_restart_on_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("vetassist.db");

    let api = Arc::new(MockChatApi::new());
    {
        let kv = Arc::new(SqliteStore::new(&db_path).unwrap());
        let controller = ChatController::new(api.clone(), kv, ChatConfig::default());
        controller.restore();
        api.push_chat(Ok(ChatReply::ok("Isolate the animal.")));
        controller.send("My sheep has a rash").await;
    }

    let kv = Arc::new(SqliteStore::new(&db_path).unwrap());
    let controller = ChatController::new(api, kv, ChatConfig::default());
    controller.restore();
    let texts: Vec<String> = controller.messages().into_iter().map(|m| m.text).collect();
    assert_eq!(texts, vec!["My sheep has a rash", "Isolate the animal."]);
}
