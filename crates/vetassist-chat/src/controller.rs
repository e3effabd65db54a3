//! Chat controller: the command interface a UI drives.
//!
//! Owns the session store, settings, chat language and pending input behind
//! one mutex, and talks to voice input, voice output and the remote chat
//! service. Every visible effect is published as a [`ChatEvent`]; commands
//! never fail the process, they end in a notification and a reusable state.
//!
//! The state lock is never held across an `.await`. Overlapping sends are
//! not serialized: each is an independent at-most-once request.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Local;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use vetassist_core::config::ChatConfig;
use vetassist_core::events::{ChatEvent, NotificationLevel};
use vetassist_core::language::{is_known_locale, voice_locale_for, DEFAULT_VOICE_LOCALE};
use vetassist_core::types::{Message, SessionKey, Sender, Settings};
use vetassist_dictation::{
    RecognizerEvent, RecognizerOutcome, RecordingState, VoiceInputController, VoiceInputError,
};
use vetassist_speech::VoiceOutputController;
use vetassist_storage::{load_settings, save_settings, KeyValueStore, SessionStore, StoredMessage};

use crate::api::{
    ApiError, ChatApi, ChatReply, ChatRequest, HealthResponse, HistoryEntry, SessionSummary,
    UploadRequest,
};
use crate::error::ChatError;
use crate::quick::QuickAction;
use crate::upload::UploadFile;

/// Capacity of the event channel; slow subscribers lag rather than block.
const EVENT_CHANNEL_CAPACITY: usize = 256;

const IDLE_INDICATOR: &str = "Online - Ready to help with animal health";
const ANALYSIS_TITLE: &str = "Image Analysis Results";
const MARATHI_SELECTED: &str =
    "🇮🇳 मराठी भाषा निवडली गेली. आता आपण मराठीत प्रश्न विचारू शकता!";
const RECOGNITION_UNSUPPORTED: &str = "❌ Speech recognition not supported";

/// How a send or upload ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input; nothing happened.
    Ignored,
    /// The server answered and the answer was appended.
    Replied,
    /// The server failed but supplied a fallback answer, which was appended.
    Fallback,
    /// The server failed without a fallback; an error message was appended.
    ServerError,
    /// No usable response; a local error message was appended.
    TransportError,
    /// The reply arrived after its session was replaced or cleared and was
    /// dropped.
    Discarded,
}

/// Which endpoint a reply came from, for the failure texts.
#[derive(Debug, Clone, Copy)]
enum Exchange {
    Chat,
    Upload,
}

struct ControllerState {
    sessions: SessionStore,
    settings: Settings,
    language: String,
    pending_input: String,
}

pub struct ChatController {
    api: Arc<dyn ChatApi>,
    kv: Arc<dyn KeyValueStore>,
    config: ChatConfig,
    state: Mutex<ControllerState>,
    voice_input: Option<Arc<VoiceInputController>>,
    voice_output: Option<Arc<VoiceOutputController>>,
    events: broadcast::Sender<ChatEvent>,
    /// Bumped whenever the current conversation is replaced or cleared.
    generation: AtomicU64,
    unsupported_notified: AtomicBool,
}

impl std::fmt::Debug for ChatController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock_state();
        f.debug_struct("ChatController")
            .field("current_session", &state.sessions.current_key())
            .field("language", &state.language)
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish()
    }
}

impl ChatController {
    /// Create a controller with empty state. Call [`restore`](Self::restore)
    /// to load persisted settings and history.
    pub fn new(api: Arc<dyn ChatApi>, kv: Arc<dyn KeyValueStore>, config: ChatConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let language = config.default_language.clone();
        Self {
            api,
            state: Mutex::new(ControllerState {
                sessions: SessionStore::new(kv.clone()),
                settings: Settings::default(),
                language,
                pending_input: String::new(),
            }),
            kv,
            config,
            voice_input: None,
            voice_output: None,
            events,
            generation: AtomicU64::new(0),
            unsupported_notified: AtomicBool::new(false),
        }
    }

    pub fn with_voice_input(mut self, input: Arc<VoiceInputController>) -> Self {
        self.voice_input = Some(input);
        self
    }

    pub fn with_voice_output(mut self, output: Arc<VoiceOutputController>) -> Self {
        self.voice_output = Some(output);
        self
    }

    /// Subscribe to controller events.
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.events.subscribe()
    }

    fn lock_state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, event: ChatEvent) {
        debug!(event = event.event_name(), "Chat event");
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn notify(&self, level: NotificationLevel, text: impl Into<String>) {
        self.emit(ChatEvent::notify(level, text));
    }

    fn emit_stored(&self, stored: StoredMessage) {
        self.emit(ChatEvent::MessageAppended {
            session_key: stored.session_key,
            message: stored.message,
            exchanges: stored.exchanges,
        });
    }

    fn persist_settings(&self, settings: &Settings) {
        if let Err(e) = save_settings(&*self.kv, settings) {
            warn!(error = %e, "Failed to save settings");
        }
    }

    // =========================================================================
    // Startup
    // =========================================================================

    /// Load settings and session history, replay the current session, and
    /// prepare voice input and output for the chat language.
    ///
    /// Nothing is written back to storage.
    pub fn restore(&self) {
        let sessions = SessionStore::restore(self.kv.clone());
        let mut settings = load_settings(&*self.kv);

        let language = self.lock_state().language.clone();
        let locale = voice_locale_for(&language);
        settings.voice_language = locale.to_string();
        settings.selected_voice = self.select_voice(&language, locale);

        let recognition_available = self
            .voice_input
            .as_ref()
            .is_some_and(|input| input.is_supported());
        if !recognition_available && settings.voice_input_enabled {
            info!("Speech recognition unavailable, disabling voice input");
            settings.voice_input_enabled = false;
        }

        let replay = {
            let mut state = self.lock_state();
            state.sessions = sessions;
            state.settings = settings;
            state
                .sessions
                .current_key()
                .filter(|key| state.sessions.contains(key))
                .cloned()
                .map(|key| (key, state.sessions.current_messages().to_vec()))
        };

        if let Some(input) = &self.voice_input {
            input.set_locale(locale);
        }
        if !recognition_available {
            self.notify_unsupported();
        }

        if let Some((session_key, messages)) = replay {
            info!(session_key = %session_key, messages = messages.len(), "Restored chat session");
            self.emit(ChatEvent::HistoryRestored {
                session_key,
                messages,
            });
        }
    }

    fn notify_unsupported(&self) {
        if !self.unsupported_notified.swap(true, Ordering::SeqCst) {
            self.notify(NotificationLevel::Error, RECOGNITION_UNSUPPORTED);
        }
    }

    fn select_voice(
        &self,
        language: &str,
        locale: &str,
    ) -> Option<vetassist_core::types::VoiceRef> {
        self.voice_output
            .as_ref()
            .and_then(|output| output.select_voice_for(language, locale))
            .map(|voice| voice.to_ref())
    }

    // =========================================================================
    // Message exchange
    // =========================================================================

    /// Send a chat message.
    ///
    /// Blank input is ignored. Otherwise the user message is stored before
    /// the request is issued, and exactly one bot message (answer, fallback
    /// or error) is stored when it completes, unless the reply is stale and
    /// stale replies are discarded.
    pub async fn send(&self, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Ignored;
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let (session_key, stored, language) = {
            let mut state = self.lock_state();
            let key = state.sessions.ensure_current();
            let stored = state.sessions.store_message(&key, Sender::User, text);
            state.pending_input.clear();
            (key, stored, state.language.clone())
        };
        self.emit_stored(stored);
        self.emit(ChatEvent::InputCleared);
        self.emit(ChatEvent::TypingStarted);

        let request = ChatRequest {
            message: text.to_string(),
            language,
            session_key: session_key.to_string(),
        };
        info!(session_key = %session_key, "Sending chat message");
        let result = self.api.chat(&request).await;
        self.emit(ChatEvent::TypingStopped);

        self.finish_exchange(Exchange::Chat, &session_key, generation, result)
            .await
    }

    /// Send whatever is in the pending-input field.
    pub async fn send_pending(&self) -> SendOutcome {
        let text = self.pending_input();
        self.send(&text).await
    }

    /// Upload a file for analysis.
    ///
    /// Size and type are checked first; a file that fails either check is
    /// reported and never reaches the network.
    pub async fn upload(&self, file: UploadFile) -> Result<SendOutcome, ChatError> {
        if let Err(e) = file.validate(
            self.config.upload_max_bytes,
            &self.config.upload_allowed_types,
        ) {
            warn!(file = %file.name, error = %e, "Upload rejected");
            self.notify(NotificationLevel::Error, e.to_string());
            return Err(e);
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let (session_key, stored, language) = {
            let mut state = self.lock_state();
            let key = state.sessions.ensure_current();
            let stored = state
                .sessions
                .store_message(&key, Sender::User, file.display_label());
            (key, stored, state.language.clone())
        };
        self.emit_stored(stored);
        self.emit(ChatEvent::TypingStarted);

        info!(session_key = %session_key, file = %file.name, size = file.size, "Uploading file");
        let request = UploadRequest {
            file,
            language,
            question: self.config.upload_prompt.clone(),
        };
        let result = self.api.upload(&request).await;
        self.emit(ChatEvent::TypingStopped);

        Ok(self
            .finish_exchange(Exchange::Upload, &session_key, generation, result)
            .await)
    }

    /// Read a file from disk and upload it.
    pub async fn upload_path(&self, path: &Path) -> Result<SendOutcome, ChatError> {
        match UploadFile::from_path(path, self.config.upload_max_bytes).await {
            Ok(file) => self.upload(file).await,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read upload");
                let text = match &e {
                    ChatError::Io(io) => format!("File upload failed: {}", io),
                    other => other.to_string(),
                };
                self.notify(NotificationLevel::Error, text);
                Err(e)
            }
        }
    }

    async fn finish_exchange(
        &self,
        exchange: Exchange,
        origin: &SessionKey,
        generation: u64,
        result: Result<ChatReply, ApiError>,
    ) -> SendOutcome {
        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                error!(session_key = %origin, error = %e, "Request failed");
                let (text, toast) = match exchange {
                    Exchange::Chat => {
                        let text = match &e {
                            ApiError::Transport(_) => "❌ Unable to connect to the server. Please check your internet connection and try again.".to_string(),
                            other => format!("❌ An error occurred: {}", other),
                        };
                        (text, format!("Connection failed: {}", e))
                    }
                    Exchange::Upload => (
                        "❌ I encountered an error analyzing your file. Please try again."
                            .to_string(),
                        format!("File upload failed: {}", e),
                    ),
                };
                if !self.deliver(generation, &text) {
                    return SendOutcome::Discarded;
                }
                self.notify(NotificationLevel::Error, toast);
                return SendOutcome::TransportError;
            }
        };

        if reply.success {
            let response = reply.response.unwrap_or_default();
            if !self.deliver(generation, &response) {
                return SendOutcome::Discarded;
            }
            if let Some(server_key) = reply.session_key.filter(|k| !k.is_empty()) {
                self.adopt_server_key(origin, SessionKey::from(server_key));
            }
            if reply.kind.as_deref() == Some("image_analysis") {
                self.emit(ChatEvent::AnalysisReady {
                    title: ANALYSIS_TITLE.to_string(),
                    content: response.clone(),
                });
            }
            self.speak(&response).await;
            return SendOutcome::Replied;
        }

        let (default_error, default_toast) = match exchange {
            Exchange::Chat => (
                "Sorry, I encountered an error. Please try again.",
                "Service temporarily unavailable",
            ),
            Exchange::Upload => ("File analysis failed", "File analysis service unavailable"),
        };
        warn!(session_key = %origin, error = ?reply.error, "Server reported failure");
        let toast = reply
            .error
            .clone()
            .unwrap_or_else(|| default_toast.to_string());

        match reply.fallback_response.filter(|f| !f.trim().is_empty()) {
            Some(fallback) => {
                if !self.deliver(generation, &fallback) {
                    return SendOutcome::Discarded;
                }
                self.notify(NotificationLevel::Error, toast);
                self.speak(&fallback).await;
                SendOutcome::Fallback
            }
            None => {
                let text = format!(
                    "❌ {}",
                    reply.error.as_deref().unwrap_or(default_error)
                );
                if !self.deliver(generation, &text) {
                    return SendOutcome::Discarded;
                }
                self.notify(NotificationLevel::Error, toast);
                SendOutcome::ServerError
            }
        }
    }

    /// Store a bot message in the then-current session.
    ///
    /// With stale discarding enabled, returns `false` and stores nothing if
    /// the conversation was replaced or cleared since `generation`.
    fn deliver(&self, generation: u64, text: &str) -> bool {
        let stored = {
            let mut state = self.lock_state();
            if self.config.discard_stale_responses
                && self.generation.load(Ordering::SeqCst) != generation
            {
                info!("Discarding reply for a replaced session");
                return false;
            }
            let key = state.sessions.ensure_current();
            state.sessions.store_message(&key, Sender::Bot, text)
        };
        self.emit_stored(stored);
        true
    }

    /// Follow a server-assigned key, but only while the request's session is
    /// still current.
    fn adopt_server_key(&self, origin: &SessionKey, server_key: SessionKey) {
        if &server_key == origin {
            return;
        }
        let mut state = self.lock_state();
        if state.sessions.current_key() == Some(origin) {
            state.sessions.adopt_key(server_key);
        } else {
            debug!(server_key = %server_key, "Ignoring server key for a replaced session");
        }
    }

    async fn speak(&self, text: &str) {
        let Some(output) = &self.voice_output else {
            return;
        };
        let (language, settings) = {
            let state = self.lock_state();
            (state.language.clone(), state.settings.clone())
        };
        let outcome = output.speak(text, &language, &settings).await;
        debug!(?outcome, "Speech finished");
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Start a fresh, empty session and make it current.
    pub fn new_session(&self) -> SessionKey {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let key = {
            let mut state = self.lock_state();
            state.pending_input.clear();
            state.sessions.start_new_session()
        };
        self.emit(ChatEvent::SessionStarted {
            session_key: key.clone(),
        });
        self.notify(NotificationLevel::Success, "Started new chat session");
        key
    }

    /// Clear the current session on the server, then locally.
    ///
    /// Local history is removed only after the server confirms; on any
    /// failure it is left untouched.
    pub async fn clear_session(&self) -> Result<(), ChatError> {
        let Some(key) = self.current_session_key() else {
            self.notify(NotificationLevel::Info, "No active session to clear");
            return Err(ChatError::NoActiveSession);
        };

        match self.api.clear(key.as_str()).await {
            Ok(ack) if ack.success => {
                self.generation.fetch_add(1, Ordering::SeqCst);
                self.lock_state().sessions.remove_session(&key);
                info!(session_key = %key, "Session cleared");
                self.emit(ChatEvent::HistoryCleared { session_key: key });
                self.notify(NotificationLevel::Success, "Chat history cleared");
                Ok(())
            }
            Ok(ack) => {
                warn!(session_key = %key, error = ?ack.error, "Server refused to clear session");
                self.notify(NotificationLevel::Error, "Failed to clear chat history");
                Err(ChatError::Remote(
                    ack.error.unwrap_or_else(|| "clear was not acknowledged".to_string()),
                ))
            }
            Err(e) => {
                error!(session_key = %key, error = %e, "Error clearing session");
                self.notify(NotificationLevel::Error, "Failed to clear chat history");
                Err(e.into())
            }
        }
    }

    /// Conversations the server has on record, newest first. Empty on failure.
    pub async fn remote_sessions(&self) -> Vec<SessionSummary> {
        match self.api.sessions().await {
            Ok(resp) if resp.success => resp.sessions,
            Ok(resp) => {
                warn!(error = ?resp.error, "Server refused session list");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch sessions");
                Vec::new()
            }
        }
    }

    /// Server-side question/answer pairs for `session_key`.
    pub async fn remote_history(
        &self,
        session_key: &SessionKey,
    ) -> Result<Vec<HistoryEntry>, ChatError> {
        let resp = self.api.history(session_key.as_str()).await?;
        if resp.success {
            Ok(resp.history)
        } else {
            Err(ChatError::Remote(resp.error.unwrap_or_else(|| {
                "Failed to retrieve chat history".to_string()
            })))
        }
    }

    // =========================================================================
    // Voice input
    // =========================================================================

    /// Start recording if idle, stop if recording.
    pub async fn toggle_voice_input(&self) -> Result<RecordingState, ChatError> {
        let Some(input) = self.voice_input.clone() else {
            self.notify_unsupported();
            return Err(VoiceInputError::Unsupported.into());
        };
        let enabled = self.lock_state().settings.voice_input_enabled;

        match input.toggle(enabled).await {
            Ok(state) => {
                self.emit(ChatEvent::RecordingChanged {
                    recording: state == RecordingState::Recording,
                });
                Ok(state)
            }
            Err(e) => {
                warn!(error = %e, "Voice input did not start");
                self.notify(NotificationLevel::Error, format!("❌ {}", e));
                Err(e.into())
            }
        }
    }

    /// Stop recording. Returns whether a recording was in progress.
    pub fn stop_voice_input(&self) -> bool {
        let stopped = self.voice_input.as_ref().is_some_and(|input| input.stop());
        if stopped {
            self.emit(ChatEvent::RecordingChanged { recording: false });
        }
        stopped
    }

    /// Apply a callback from the platform recognizer.
    pub fn handle_recognizer_event(&self, event: RecognizerEvent) -> RecognizerOutcome {
        let Some(input) = &self.voice_input else {
            return RecognizerOutcome::Nothing;
        };
        let outcome = input.handle_event(event);
        match &outcome {
            RecognizerOutcome::Listening => {
                self.notify(NotificationLevel::Info, "🎤 Listening... Speak now");
            }
            RecognizerOutcome::Transcript(text) => {
                self.lock_state().pending_input = text.clone();
                self.emit(ChatEvent::InputFilled { text: text.clone() });
                self.notify(NotificationLevel::Success, "✅ Speech captured successfully!");
            }
            RecognizerOutcome::Failed(kind) => {
                self.emit(ChatEvent::RecordingChanged { recording: false });
                self.notify(NotificationLevel::Error, format!("❌ {}", kind));
            }
            RecognizerOutcome::Ended => {
                self.emit(ChatEvent::RecordingChanged { recording: false });
            }
            RecognizerOutcome::Nothing => {}
        }
        outcome
    }

    // =========================================================================
    // Language and settings
    // =========================================================================

    /// Switch the chat language and retarget both voice directions.
    pub fn set_language(&self, code: &str) {
        let code = code.trim();
        let locale = voice_locale_for(code);
        if let Some(output) = &self.voice_output {
            output.voices_changed();
        }
        let selected_voice = self.select_voice(code, locale);

        let settings = {
            let mut state = self.lock_state();
            state.language = code.to_string();
            state.settings.voice_language = locale.to_string();
            state.settings.selected_voice = selected_voice;
            state.settings.clone()
        };
        self.persist_settings(&settings);
        if let Some(input) = &self.voice_input {
            input.set_locale(locale);
        }

        info!(language = %code, locale = %locale, "Chat language changed");
        self.emit(ChatEvent::LanguageChanged {
            language: code.to_string(),
            locale: locale.to_string(),
        });
        if code == "mr" {
            self.notify(NotificationLevel::Success, MARATHI_SELECTED);
        }
    }

    /// Change settings through `update`, then persist and apply side effects.
    ///
    /// An unknown voice language is replaced by the default locale.
    pub fn update_settings<F>(&self, update: F) -> Settings
    where
        F: FnOnce(&mut Settings),
    {
        let (before, after) = {
            let mut state = self.lock_state();
            let before = state.settings.clone();
            update(&mut state.settings);
            if !is_known_locale(&state.settings.voice_language) {
                warn!(locale = %state.settings.voice_language, "Unknown voice language, using default");
                state.settings.voice_language = DEFAULT_VOICE_LOCALE.to_string();
            }
            if state.settings.voice_language != before.voice_language {
                state.settings.selected_voice = None;
            }
            (before, state.settings.clone())
        };
        self.persist_settings(&after);

        if after.voice_language != before.voice_language {
            if let Some(input) = &self.voice_input {
                input.set_locale(&after.voice_language);
            }
        }
        if before.tts_enabled && !after.tts_enabled {
            if let Some(output) = &self.voice_output {
                output.cancel();
            }
        }
        if before.voice_input_enabled && !after.voice_input_enabled {
            self.stop_voice_input();
        }

        debug!(?after, "Settings updated");
        self.emit(ChatEvent::SettingsChanged {
            settings: after.clone(),
        });
        after
    }

    /// Fill the input with a canned question. Does not send.
    pub fn quick_action(&self, action: QuickAction) -> &'static str {
        let prompt = action.prompt();
        self.set_pending_input(prompt);
        prompt
    }

    /// Replace the pending-input text, as a UI does while the user types.
    pub fn set_pending_input(&self, text: &str) {
        self.lock_state().pending_input = text.to_string();
        self.emit(ChatEvent::InputFilled {
            text: text.to_string(),
        });
    }

    /// Pause speech while the UI is hidden and resume when it returns.
    pub fn on_visibility_change(&self, hidden: bool) {
        if let Some(output) = &self.voice_output {
            output.on_visibility_change(hidden);
        }
    }

    /// Languages the server supports, code to display name. Empty on failure.
    pub async fn load_languages(&self) -> BTreeMap<String, String> {
        match self.api.languages().await {
            Ok(resp) if resp.success => {
                debug!(count = resp.languages.len(), "Loaded languages");
                resp.languages
            }
            Ok(resp) => {
                warn!(error = ?resp.error, "Server refused language list");
                BTreeMap::new()
            }
            Err(e) => {
                warn!(error = %e, "Error loading languages");
                BTreeMap::new()
            }
        }
    }

    /// Ask the server whether the assistant is fully available.
    pub async fn check_health(&self) -> Option<HealthResponse> {
        match self.api.health().await {
            Ok(health) if health.success && health.healthy => {
                info!("Chatbot service is healthy");
                Some(health)
            }
            Ok(health) => {
                let reason = health.message.as_deref().unwrap_or("service degraded");
                warn!(reason = %reason, "Chatbot service degraded");
                self.notify(
                    NotificationLevel::Info,
                    format!("⚠️ Some chatbot features may be limited: {}", reason),
                );
                Some(health)
            }
            Err(e) => {
                error!(error = %e, "Health check failed");
                self.notify(
                    NotificationLevel::Error,
                    "⚠️ Unable to verify chatbot status. Some features may be limited.",
                );
                None
            }
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn current_session_key(&self) -> Option<SessionKey> {
        self.lock_state().sessions.current_key().cloned()
    }

    /// Messages of the current session, oldest first.
    pub fn messages(&self) -> Vec<Message> {
        self.lock_state().sessions.current_messages().to_vec()
    }

    pub fn settings(&self) -> Settings {
        self.lock_state().settings.clone()
    }

    pub fn language(&self) -> String {
        self.lock_state().language.clone()
    }

    pub fn pending_input(&self) -> String {
        self.lock_state().pending_input.clone()
    }

    pub fn is_recording(&self) -> bool {
        self.voice_input
            .as_ref()
            .is_some_and(|input| input.is_recording())
    }

    /// One-line status: session start time and exchange count.
    pub fn session_indicator(&self) -> String {
        let state = self.lock_state();
        match state.sessions.current_key() {
            Some(key) => {
                let started = key
                    .created_at()
                    .map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string())
                    .unwrap_or_else(|| key.to_string());
                format!(
                    "Session: {} ({} exchanges)",
                    started,
                    state.sessions.exchange_count()
                )
            }
            None => IDLE_INDICATOR.to_string(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
