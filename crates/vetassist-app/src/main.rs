//! VetAssist application binary - composition root.
//!
//! Ties together all VetAssist crates into a single executable:
//! 1. Load configuration from TOML and apply CLI overrides
//! 2. Open the local chat database (SQLite key/value store)
//! 3. Build the HTTP client for the veterinary web application
//! 4. Wire voice input/output into the chat controller
//! 5. Run the interactive chat or a one-shot command

mod cli;
mod repl;

use std::io::Write;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::broadcast;

use vetassist_chat::api::SignupRequest;
use vetassist_chat::{ChatApi, ChatController, HttpChatApi, SendOutcome};
use vetassist_core::config::VetAssistConfig;
use vetassist_core::events::ChatEvent;
use vetassist_dictation::{UnavailableMicrophone, UnavailableRecognizer, VoiceInputController};
use vetassist_speech::{LogSynthesizer, VoiceOutputController};
use vetassist_storage::SqliteStore;

use cli::{CliArgs, Command};

/// Print whatever the controller reported during a one-shot command.
fn print_pending(rx: &mut broadcast::Receiver<ChatEvent>) {
    while let Ok(event) = rx.try_recv() {
        if let Some(text) = repl::render_event(&event) {
            println!("{text}");
        }
    }
}

/// Password from VETASSIST_PASSWORD, or typed on stdin.
fn read_password() -> std::io::Result<String> {
    if let Ok(password) = std::env::var("VETASSIST_PASSWORD") {
        return Ok(password);
    }
    print!("Password: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = VetAssistConfig::load_or_default(&config_file);
    if let Some(server) = args.resolve_server() {
        config.server.base_url = server;
    }
    if let Some(data_dir) = args.resolve_data_dir() {
        config.general.data_dir = data_dir;
    }
    if let Some(level) = args.resolve_log_level() {
        config.general.log_level = level;
    }
    if let Some(ref language) = args.language {
        config.chat.default_language = language.clone();
    }

    // Tracing. Logs go to stderr so they never mix with chat output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting VetAssist v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), server = %config.server.base_url, "Configuration loaded");

    // Storage.
    let data_dir = config.general.resolved_data_dir();
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!(path = %data_dir.display(), error = %e, "Failed to create data directory");
        return Err(e.into());
    }
    let db_path = data_dir.join("vetassist.db");
    let store = Arc::new(SqliteStore::new(&db_path)?);
    tracing::info!(path = %db_path.display(), "SQLite database opened");

    // Remote service.
    let api = Arc::new(HttpChatApi::new(&config.server)?);

    // Voice. A terminal has no recognizer; spoken replies are logged.
    let voice_input = Arc::new(VoiceInputController::new(
        Arc::new(UnavailableRecognizer),
        Arc::new(UnavailableMicrophone),
    ));
    let voice_output = Arc::new(VoiceOutputController::new(
        Arc::new(LogSynthesizer),
        config.voice.clone(),
    ));

    let controller = Arc::new(
        ChatController::new(api.clone(), store, config.chat.clone())
            .with_voice_input(voice_input)
            .with_voice_output(voice_output),
    );

    let command = args.command();
    let mut events = controller.subscribe();

    // Login first so the session cookie covers every later request.
    if let Some(ref email) = args.email {
        if !matches!(command, Command::Signup { .. }) {
            let password = read_password()?;
            let auth = api.login(email, &password).await?;
            if !auth.success {
                let reason = auth.message.unwrap_or_else(|| "Login failed".to_string());
                return Err(reason.into());
            }
            tracing::info!(email = %email, "Logged in");
        }
    }

    match command {
        Command::Chat => {
            drop(events);
            controller.restore();
            if let Some(ref language) = args.language {
                controller.set_language(language);
            }
            repl::run(controller).await;
        }
        Command::Send { message } => {
            controller.restore();
            let outcome = controller.send(&message.join(" ")).await;
            print_pending(&mut events);
            if matches!(
                outcome,
                SendOutcome::ServerError | SendOutcome::TransportError
            ) {
                return Err("message was not answered".into());
            }
        }
        Command::Upload { path } => {
            controller.restore();
            let result = controller.upload_path(&path).await;
            print_pending(&mut events);
            result?;
        }
        Command::Health => {
            let health = controller.check_health().await;
            print_pending(&mut events);
            match health {
                Some(health) => {
                    println!("healthy: {}", health.healthy);
                    for (service, status) in &health.services {
                        println!("  {service}: {status}");
                    }
                }
                None => return Err("health check failed".into()),
            }
        }
        Command::Sessions => {
            for s in controller.remote_sessions().await {
                println!(
                    "{}  {} messages  {}",
                    s.session_key, s.message_count, s.preview
                );
            }
        }
        Command::Languages => {
            for (code, name) in controller.load_languages().await {
                println!("{code:<4} {name}");
            }
        }
        Command::Login => {
            if args.email.is_none() {
                return Err("login requires --email".into());
            }
            println!("Logged in.");
        }
        Command::Signup { name } => {
            let Some(email) = args.email.clone() else {
                return Err("signup requires --email".into());
            };
            let password = read_password()?;
            let auth = api
                .signup(&SignupRequest {
                    name,
                    email,
                    confirm_password: password.clone(),
                    password,
                })
                .await?;
            if !auth.success {
                let reason = auth
                    .message
                    .unwrap_or_else(|| "Registration failed".to_string());
                return Err(reason.into());
            }
            println!("Account created.");
        }
    }

    Ok(())
}
