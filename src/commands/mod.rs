//! CLI command definitions and dispatch.

pub mod config;
pub mod password;
pub mod permission;
pub mod token;

use clap::{Parser, Subcommand};

use gatehouse_core::config::AppConfig;
use gatehouse_core::error::AppError;

use crate::output::OutputFormat;

/// Gatehouse: identity and authorization core
#[derive(Debug, Parser)]
#[command(name = "gatehouse", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Environment overlay, read from `config/{env}.toml`
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Password hashing and policy checks
    Password(password::PasswordArgs),
    /// Permission value utilities
    Permission(permission::PermissionArgs),
    /// Bearer token utilities
    Token(token::TokenArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Password(args) => password::execute(args, &config, self.format).await,
            Commands::Permission(args) => permission::execute(args, self.format).await,
            Commands::Token(args) => token::execute(args, &config, self.format).await,
            Commands::Config(args) => config::execute(args, &config, &self.config, self.format).await,
        }
    }
}

/// Helper: take a secret from the command line or, when absent, from the
/// first line of stdin so it stays out of shell history.
pub fn secret_or_stdin(value: Option<&str>, what: &str) -> Result<String, AppError> {
    if let Some(value) = value {
        return Ok(value.to_string());
    }
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .map_err(|e| AppError::internal(format!("Failed to read {what} from stdin: {e}")))?;
    let line = line.trim_end_matches(['\r', '\n']).to_string();
    if line.is_empty() {
        return Err(AppError::validation(format!("No {what} given")));
    }
    Ok(line)
}
