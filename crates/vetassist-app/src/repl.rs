//! Interactive terminal chat.
//!
//! Stdin is read on a plain thread and forwarded over a channel so the
//! async side can await lines. Controller events are printed by a separate
//! task as they arrive.

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use tokio::sync::{broadcast, mpsc};

use vetassist_chat::{ChatController, QuickAction};
use vetassist_core::events::{ChatEvent, NotificationLevel};
use vetassist_core::types::{Message, Sender, SessionKey};

const HELP: &str = "\
Commands:
  <text>              send a message (empty line sends the filled-in input)
  /new                start a new conversation
  /clear              delete this conversation (asks first)
  /upload <path>      analyze an image or PDF
  /lang <code>        switch chat language (en, hi, mr, ...)
  /languages          list languages the server supports
  /sessions           list conversations stored on the server
  /history [key]      show server-side history
  /health             check chatbot status
  /tts on|off         read replies aloud
  /mic on|off         allow voice input
  /autoscroll on|off  auto-scroll preference
  /dark on|off        dark mode preference
  /voice              start or stop voice input
  /quick <action>     fill in a quick question (symptoms, treatment, prevention, emergency)
  /settings           show current settings
  /help               show this help
  /quit               exit";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Send(String),
    SendPending,
    NewSession,
    Clear,
    Upload(PathBuf),
    Language(String),
    Languages,
    Sessions,
    History(Option<String>),
    Health,
    Tts(bool),
    VoiceInput(bool),
    AutoScroll(bool),
    DarkMode(bool),
    ToggleVoice,
    Quick(QuickAction),
    Settings,
    Help,
    Quit,
    /// Unparseable slash command, with the reason.
    Invalid(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ReplCommand::SendPending;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return ReplCommand::Send(line.to_string());
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        match name.to_lowercase().as_str() {
            "new" => ReplCommand::NewSession,
            "clear" => ReplCommand::Clear,
            "upload" if arg.is_empty() => ReplCommand::Invalid("usage: /upload <path>".into()),
            "upload" => ReplCommand::Upload(PathBuf::from(arg)),
            "lang" | "language" if arg.is_empty() => {
                ReplCommand::Invalid("usage: /lang <code>".into())
            }
            "lang" | "language" => ReplCommand::Language(arg.to_string()),
            "languages" => ReplCommand::Languages,
            "sessions" => ReplCommand::Sessions,
            "history" if arg.is_empty() => ReplCommand::History(None),
            "history" => ReplCommand::History(Some(arg.to_string())),
            "health" => ReplCommand::Health,
            "tts" => on_off(arg, "/tts", ReplCommand::Tts),
            "mic" => on_off(arg, "/mic", ReplCommand::VoiceInput),
            "autoscroll" => on_off(arg, "/autoscroll", ReplCommand::AutoScroll),
            "dark" => on_off(arg, "/dark", ReplCommand::DarkMode),
            "voice" => ReplCommand::ToggleVoice,
            "quick" => match arg.parse::<QuickAction>() {
                Ok(action) => ReplCommand::Quick(action),
                Err(e) => ReplCommand::Invalid(e.to_string()),
            },
            "settings" => ReplCommand::Settings,
            "help" | "?" => ReplCommand::Help,
            "quit" | "exit" | "q" => ReplCommand::Quit,
            other => ReplCommand::Invalid(format!("unknown command /{other}, try /help")),
        }
    }
}

fn on_off(arg: &str, usage: &str, make: fn(bool) -> ReplCommand) -> ReplCommand {
    match arg.to_lowercase().as_str() {
        "on" | "true" | "1" => make(true),
        "off" | "false" | "0" => make(false),
        _ => ReplCommand::Invalid(format!("usage: {usage} on|off")),
    }
}

fn render_message(message: &Message) -> String {
    let time = message.timestamp.with_timezone(&Local).format("%H:%M");
    let who = match message.sender {
        Sender::User => "You",
        Sender::Bot => "VetAssist",
    };
    format!("[{time}] {who}: {}", message.text)
}

/// Terminal text for an event, or `None` for events with nothing to show.
pub fn render_event(event: &ChatEvent) -> Option<String> {
    match event {
        ChatEvent::SessionStarted { session_key } => Some(format!("── {session_key} ──")),
        ChatEvent::HistoryRestored {
            session_key,
            messages,
        } => {
            let mut out = format!("── {session_key} ({} messages) ──", messages.len());
            for message in messages {
                out.push('\n');
                out.push_str(&render_message(message));
            }
            Some(out)
        }
        ChatEvent::HistoryCleared { .. } => Some("── history cleared ──".to_string()),
        ChatEvent::MessageAppended { message, .. } => Some(render_message(message)),
        ChatEvent::TypingStarted => Some("VetAssist is thinking...".to_string()),
        ChatEvent::InputFilled { text } => Some(format!("> {text}   (press Enter to send)")),
        ChatEvent::RecordingChanged { recording: true } => Some("🎤 recording".to_string()),
        ChatEvent::RecordingChanged { recording: false } => Some("🎤 stopped".to_string()),
        ChatEvent::Notification { level, text } => {
            let tag = match level {
                NotificationLevel::Success => "ok",
                NotificationLevel::Info => "info",
                NotificationLevel::Error => "error",
            };
            Some(format!("[{tag}] {text}"))
        }
        ChatEvent::AnalysisReady { title, content } => Some(format!("{title}\n{content}")),
        ChatEvent::LanguageChanged { language, locale } => {
            Some(format!("Language: {language} (voice {locale})"))
        }
        _ => None,
    }
}

/// Print events until the controller goes away.
async fn print_events(mut rx: broadcast::Receiver<ChatEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => {
                if let Some(text) = render_event(&event) {
                    println!("{text}");
                }
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!(skipped = n, "Event printer lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Forward stdin lines to the async side. Ends on EOF.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn on_off_label(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

/// Run the interactive loop until `/quit` or end of input.
pub async fn run(controller: Arc<ChatController>) {
    let printer = tokio::spawn(print_events(controller.subscribe()));
    let mut lines = spawn_stdin_reader();

    println!("VetAssist - {}", controller.session_indicator());
    println!("Type /help for commands.");

    while let Some(line) = lines.recv().await {
        match ReplCommand::parse(&line) {
            ReplCommand::Send(text) => {
                controller.send(&text).await;
            }
            ReplCommand::SendPending => {
                controller.send_pending().await;
            }
            ReplCommand::NewSession => {
                controller.new_session();
            }
            ReplCommand::Clear => {
                println!("Are you sure you want to clear the chat history? [y/N]");
                let confirmed = lines
                    .recv()
                    .await
                    .is_some_and(|answer| matches!(answer.trim(), "y" | "Y" | "yes"));
                if confirmed {
                    // Outcome is reported through notifications.
                    let _ = controller.clear_session().await;
                }
            }
            ReplCommand::Upload(path) => {
                let _ = controller.upload_path(&path).await;
            }
            ReplCommand::Language(code) => controller.set_language(&code),
            ReplCommand::Languages => {
                let languages = controller.load_languages().await;
                let current = controller.language();
                for (code, name) in languages {
                    let marker = if code == current { "*" } else { " " };
                    println!("{marker} {code:<4} {name}");
                }
            }
            ReplCommand::Sessions => {
                let sessions = controller.remote_sessions().await;
                if sessions.is_empty() {
                    println!("No conversations on the server.");
                }
                for s in sessions {
                    println!(
                        "{}  {} messages  {}",
                        s.session_key, s.message_count, s.preview
                    );
                }
            }
            ReplCommand::History(key) => {
                let Some(key) = key.map(SessionKey::from).or_else(|| controller.current_session_key())
                else {
                    println!("No active conversation.");
                    continue;
                };
                match controller.remote_history(&key).await {
                    Ok(entries) => {
                        for entry in entries {
                            let at = entry.timestamp.as_deref().unwrap_or("-");
                            println!("[{at}] You: {}", entry.message);
                            println!("[{at}] VetAssist: {}", entry.response);
                        }
                    }
                    Err(e) => println!("[error] {e}"),
                }
            }
            ReplCommand::Health => {
                if let Some(health) = controller.check_health().await {
                    println!(
                        "healthy: {}  {}",
                        health.healthy,
                        health.message.unwrap_or_default()
                    );
                }
            }
            ReplCommand::Tts(on) => {
                controller.update_settings(|s| s.tts_enabled = on);
                println!("Text-to-speech {}", on_off_label(on));
            }
            ReplCommand::VoiceInput(on) => {
                controller.update_settings(|s| s.voice_input_enabled = on);
                println!("Voice input {}", on_off_label(on));
            }
            ReplCommand::AutoScroll(on) => {
                controller.update_settings(|s| s.auto_scroll_enabled = on);
                println!("Auto-scroll {}", on_off_label(on));
            }
            ReplCommand::DarkMode(on) => {
                controller.update_settings(|s| s.dark_mode_enabled = on);
                println!("Dark mode {}", on_off_label(on));
            }
            ReplCommand::ToggleVoice => {
                let _ = controller.toggle_voice_input().await;
            }
            ReplCommand::Quick(action) => {
                controller.quick_action(action);
            }
            ReplCommand::Settings => {
                let s = controller.settings();
                println!("language       {}", controller.language());
                println!("voice language {}", s.voice_language);
                println!("tts            {}", on_off_label(s.tts_enabled));
                println!("voice input    {}", on_off_label(s.voice_input_enabled));
                println!("auto-scroll    {}", on_off_label(s.auto_scroll_enabled));
                println!("dark mode      {}", on_off_label(s.dark_mode_enabled));
                println!("{}", controller.session_indicator());
            }
            ReplCommand::Help => println!("{HELP}"),
            ReplCommand::Quit => break,
            ReplCommand::Invalid(reason) => println!("{reason}"),
        }
    }

    controller.stop_voice_input();
    printer.abort();
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Parsing
    // =========================================================================

    #[test]
    fn test_plain_text_is_sent() {
        assert_eq!(
            ReplCommand::parse("  my goat is limping  "),
            ReplCommand::Send("my goat is limping".to_string())
        );
    }

    #[test]
    fn test_empty_line_sends_pending() {
        assert_eq!(ReplCommand::parse(""), ReplCommand::SendPending);
        assert_eq!(ReplCommand::parse("   "), ReplCommand::SendPending);
    }

    #[test]
    fn test_commands() {
        assert_eq!(ReplCommand::parse("/new"), ReplCommand::NewSession);
        assert_eq!(ReplCommand::parse("/CLEAR"), ReplCommand::Clear);
        assert_eq!(
            ReplCommand::parse("/upload ./x ray.png"),
            ReplCommand::Upload(PathBuf::from("./x ray.png"))
        );
        assert_eq!(
            ReplCommand::parse("/lang mr"),
            ReplCommand::Language("mr".to_string())
        );
        assert_eq!(ReplCommand::parse("/history"), ReplCommand::History(None));
        assert_eq!(
            ReplCommand::parse("/history chat_1_abc"),
            ReplCommand::History(Some("chat_1_abc".to_string()))
        );
        assert_eq!(ReplCommand::parse("/tts off"), ReplCommand::Tts(false));
        assert_eq!(ReplCommand::parse("/mic on"), ReplCommand::VoiceInput(true));
        assert_eq!(ReplCommand::parse("/dark on"), ReplCommand::DarkMode(true));
        assert_eq!(
            ReplCommand::parse("/quick emergency"),
            ReplCommand::Quick(QuickAction::Emergency)
        );
        assert_eq!(ReplCommand::parse("/exit"), ReplCommand::Quit);
    }

    #[test]
    fn test_invalid_commands() {
        assert!(matches!(ReplCommand::parse("/upload"), ReplCommand::Invalid(_)));
        assert!(matches!(ReplCommand::parse("/lang"), ReplCommand::Invalid(_)));
        assert!(matches!(ReplCommand::parse("/tts maybe"), ReplCommand::Invalid(_)));
        assert!(matches!(ReplCommand::parse("/quick dance"), ReplCommand::Invalid(_)));
        assert!(matches!(ReplCommand::parse("/frobnicate"), ReplCommand::Invalid(_)));
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    #[test]
    fn test_render_messages() {
        let event = ChatEvent::MessageAppended {
            session_key: SessionKey::from("chat_1_abc"),
            message: Message::new(Sender::Bot, "Keep the calf warm."),
            exchanges: 1,
        };
        let text = render_event(&event).unwrap();
        assert!(text.ends_with("VetAssist: Keep the calf warm."), "{text}");
    }

    #[test]
    fn test_render_restored_history() {
        let event = ChatEvent::HistoryRestored {
            session_key: SessionKey::from("chat_1_abc"),
            messages: vec![
                Message::new(Sender::User, "hello"),
                Message::new(Sender::Bot, "hi!"),
            ],
        };
        let text = render_event(&event).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("2 messages"));
        assert!(lines[1].ends_with("You: hello"));
    }

    #[test]
    fn test_render_notification_levels() {
        let event = ChatEvent::notify(NotificationLevel::Error, "Failed to send message");
        assert_eq!(
            render_event(&event).as_deref(),
            Some("[error] Failed to send message")
        );
    }

    #[test]
    fn test_silent_events() {
        assert!(render_event(&ChatEvent::TypingStopped).is_none());
        assert!(render_event(&ChatEvent::InputCleared).is_none());
    }
}
