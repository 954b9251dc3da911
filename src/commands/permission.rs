//! Permission value CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;

use gatehouse_core::error::AppError;
use gatehouse_entity::permission::PermissionValue;

use crate::output::{self, OutputFormat};

/// Arguments for permission commands
#[derive(Debug, Args)]
pub struct PermissionArgs {
    /// Permission subcommand
    #[command(subcommand)]
    pub command: PermissionCommand,
}

/// Permission subcommands
#[derive(Debug, Subcommand)]
pub enum PermissionCommand {
    /// Split a `Group.Name.Access` value into its segments
    Parse {
        /// The permission value
        value: String,
    },
    /// Build a permission value from its segments
    Compose {
        /// Capability group, e.g. `Users`
        group: String,
        /// Capability name, e.g. `Profile`
        name: String,
        /// Access level, e.g. `Edit`
        access: String,
    },
}

#[derive(Serialize)]
struct PermissionReport<'a> {
    value: String,
    group: &'a str,
    name: &'a str,
    access: &'a str,
}

/// Execute permission commands
pub async fn execute(args: &PermissionArgs, format: OutputFormat) -> Result<(), AppError> {
    let value: PermissionValue = match &args.command {
        PermissionCommand::Parse { value } => value.parse()?,
        PermissionCommand::Compose {
            group,
            name,
            access,
        } => PermissionValue::compose(group, name, access)?,
    };

    let (group, name, access) = value.decompose();
    match format {
        OutputFormat::Json => output::print_json(&PermissionReport {
            value: value.to_string(),
            group,
            name,
            access,
        }),
        OutputFormat::Text => {
            output::print_kv("Value", &value.to_string());
            output::print_kv("Group", group);
            output::print_kv("Name", name);
            output::print_kv("Access", access);
        }
    }
    Ok(())
}
