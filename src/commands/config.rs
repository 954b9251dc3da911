//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use gatehouse_core::config::AppConfig;
use gatehouse_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Validate the merged configuration
    Check,
}

/// Execute config commands
pub async fn execute(
    args: &ConfigArgs,
    config: &AppConfig,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Check => {
            if let Err(e) = config.validate() {
                output::print_error(&format!("Configuration invalid: {e}"));
                return Err(e);
            }

            match format {
                OutputFormat::Json => {
                    let mut redacted = config.clone();
                    redacted.auth.jwt_secret = "****".to_string();
                    output::print_json(&redacted);
                }
                OutputFormat::Text => {
                    output::print_success(&format!("Configuration '{config_path}' is valid"));
                    output::print_kv("Issuer", &config.auth.jwt_issuer);
                    output::print_kv(
                        "Access token TTL",
                        &format!("{} min", config.auth.access_token_ttl_minutes),
                    );
                    output::print_kv(
                        "Refresh token TTL",
                        &format!("{} days", config.auth.refresh_token_ttl_days),
                    );
                    output::print_kv(
                        "Lockout threshold",
                        &config.lockout.max_failed_attempts.to_string(),
                    );
                    output::print_kv("Admin role", &config.accounts.admin_role);
                    output::print_kv("Default role", &config.accounts.default_role);
                }
            }
        }
    }

    Ok(())
}
