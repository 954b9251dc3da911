//! Password strength policy.

use serde::{Deserialize, Serialize};

/// Character-class and length rules applied to new passwords.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordPolicyConfig {
    /// Minimum password length in characters.
    #[serde(default = "default_min_length")]
    pub min_length: usize,
    /// Require at least one uppercase letter.
    #[serde(default = "default_true")]
    pub require_uppercase: bool,
    /// Require at least one lowercase letter.
    #[serde(default = "default_true")]
    pub require_lowercase: bool,
    /// Require at least one ASCII digit.
    #[serde(default = "default_true")]
    pub require_digit: bool,
    /// Require at least one non-alphanumeric character.
    #[serde(default = "default_true")]
    pub require_symbol: bool,
    /// Minimum zxcvbn score (0 to 4). Zero skips the entropy estimate.
    #[serde(default = "default_min_strength_score")]
    pub min_strength_score: u8,
}

impl Default for PasswordPolicyConfig {
    fn default() -> Self {
        Self {
            min_length: default_min_length(),
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_symbol: true,
            min_strength_score: default_min_strength_score(),
        }
    }
}

fn default_min_length() -> usize {
    8
}

fn default_min_strength_score() -> u8 {
    3
}

fn default_true() -> bool {
    true
}
