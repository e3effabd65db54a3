//! CLI argument definitions for the VetAssist client.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// VetAssist - veterinary health assistant in the terminal.
#[derive(Parser, Debug)]
#[command(name = "vetassist", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Base URL of the veterinary web application.
    #[arg(short = 's', long = "server")]
    pub server: Option<String>,

    /// Data directory for the local chat database.
    #[arg(short = 'd', long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Chat language code (en, hi, mr, ...).
    #[arg(long = "language")]
    pub language: Option<String>,

    /// Log in with this account before running the command.
    #[arg(short = 'e', long = "email")]
    pub email: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Interactive chat (default).
    Chat,
    /// Send one message and print the reply.
    Send {
        #[arg(required = true)]
        message: Vec<String>,
    },
    /// Upload an image or PDF for analysis.
    Upload { path: PathBuf },
    /// Check chatbot service health.
    Health,
    /// List conversations stored on the server.
    Sessions,
    /// List languages the server supports.
    Languages,
    /// Log in (requires --email).
    Login,
    /// Create an account (requires --email).
    Signup {
        #[arg(long)]
        name: String,
    },
}

impl CliArgs {
    /// The command to run, `chat` when none was given.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Chat)
    }

    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > VETASSIST_CONFIG env var > ~/.vetassist/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("VETASSIST_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the server base URL.
    ///
    /// Priority: --server flag > VETASSIST_SERVER env var.
    /// Returns `None` if neither is set (use config value).
    pub fn resolve_server(&self) -> Option<String> {
        if let Some(ref s) = self.server {
            return Some(s.clone());
        }
        std::env::var("VETASSIST_SERVER")
            .ok()
            .filter(|s| !s.trim().is_empty())
    }

    /// Resolve the data directory path.
    ///
    /// Returns `None` if not overridden (use config default).
    pub fn resolve_data_dir(&self) -> Option<String> {
        self.data_dir
            .as_ref()
            .map(|p| p.to_string_lossy().to_string())
    }

    /// Resolve the log level.
    ///
    /// Returns `None` if not overridden.
    pub fn resolve_log_level(&self) -> Option<String> {
        self.log_level.clone()
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".vetassist").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".vetassist").join("config.toml");
    }
    PathBuf::from("config.toml")
}
