//! Password CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;

use gatehouse_auth::password::{Argon2Hasher, CredentialHasher, PasswordPolicy, PasswordValidator};
use gatehouse_core::config::AppConfig;
use gatehouse_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for password commands
#[derive(Debug, Args)]
pub struct PasswordArgs {
    /// Password subcommand
    #[command(subcommand)]
    pub command: PasswordCommand,
}

/// Password subcommands
#[derive(Debug, Subcommand)]
pub enum PasswordCommand {
    /// Hash a password with Argon2id (reads stdin when omitted)
    Hash {
        /// Password to hash
        password: Option<String>,
        /// Hash even if the password fails the configured policy
        #[arg(long)]
        skip_policy: bool,
    },
    /// Check a password against the configured strength policy
    Check {
        /// Password to check
        password: Option<String>,
    },
}

#[derive(Serialize)]
struct HashReport {
    hash: String,
    salt: String,
}

/// Execute password commands
pub async fn execute(
    args: &PasswordArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let policy = PasswordValidator::new(&config.password);

    match &args.command {
        PasswordCommand::Hash {
            password,
            skip_policy,
        } => {
            let password = super::secret_or_stdin(password.as_deref(), "password")?;
            if *skip_policy {
                output::print_warning("Password policy not applied");
            } else {
                policy.check(&password)?;
            }

            let hashed = Argon2Hasher::new().hash(&password)?;
            match format {
                OutputFormat::Json => output::print_json(&HashReport {
                    hash: hashed.hash,
                    salt: hashed.salt,
                }),
                OutputFormat::Text => {
                    output::print_kv("Hash", &hashed.hash);
                    output::print_kv("Salt", &hashed.salt);
                }
            }
        }
        PasswordCommand::Check { password } => {
            let password = super::secret_or_stdin(password.as_deref(), "password")?;
            policy.check(&password)?;
            output::print_success("Password satisfies the policy");
        }
    }

    Ok(())
}
