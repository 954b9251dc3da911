//! Bearer token CLI commands.

use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;

use gatehouse_auth::jwt::{ClaimSet, JwtDecoder};
use gatehouse_core::config::AppConfig;
use gatehouse_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for token commands
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Token subcommand
    #[command(subcommand)]
    pub command: TokenCommand,
}

/// Token subcommands
#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Verify a bearer's signature (ignoring expiry) and print its claims
    Inspect {
        /// The bearer token (reads stdin when omitted)
        token: Option<String>,
    },
}

#[derive(Serialize)]
struct TokenReport {
    subject: uuid::Uuid,
    issuer: String,
    issued_at: Option<DateTime<Utc>>,
    expires_at: DateTime<Utc>,
    expired: bool,
    token_id: uuid::Uuid,
    claims: ClaimSet,
}

/// Execute token commands
pub async fn execute(
    args: &TokenArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        TokenCommand::Inspect { token } => {
            config.validate()?;
            let token = super::secret_or_stdin(token.as_deref(), "token")?;
            let claims = JwtDecoder::new(&config.auth).decode_for_refresh(&token)?;

            let report = TokenReport {
                subject: claims.sub,
                issuer: claims.iss.clone(),
                issued_at: DateTime::from_timestamp(claims.iat, 0),
                expires_at: claims.expires_at(),
                expired: claims.is_expired(),
                token_id: claims.jti,
                claims: claims.claim_set(),
            };

            match format {
                OutputFormat::Json => output::print_json(&report),
                OutputFormat::Text => {
                    output::print_kv("Subject", &report.subject.to_string());
                    output::print_kv("Username", &claims.username);
                    output::print_kv("Issuer", &report.issuer);
                    output::print_kv("Expires", &report.expires_at.to_rfc3339());
                    if report.expired {
                        output::print_warning("Token is expired (signature is valid)");
                    }
                    for role in report.claims.roles() {
                        output::print_kv("Role", role);
                    }
                    for permission in report.claims.permissions() {
                        output::print_kv("Permission", &permission.to_string());
                    }
                }
            }
        }
    }

    Ok(())
}
