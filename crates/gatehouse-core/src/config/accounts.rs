//! Role names and distinguished accounts.

use serde::{Deserialize, Serialize};

/// Account and role naming configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountsConfig {
    /// Role every newly registered user is added to.
    #[serde(default = "default_role")]
    pub default_role: String,
    /// Name of the administrator role guarded against escalation.
    #[serde(default = "default_admin_role")]
    pub admin_role: String,
    /// Username of the built-in administrator whose admin role can never
    /// be removed.
    #[serde(default = "default_admin_username")]
    pub default_admin_username: String,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            default_role: default_role(),
            admin_role: default_admin_role(),
            default_admin_username: default_admin_username(),
        }
    }
}

fn default_role() -> String {
    "User".to_string()
}

fn default_admin_role() -> String {
    "Administrator".to_string()
}

fn default_admin_username() -> String {
    "admin".to_string()
}
