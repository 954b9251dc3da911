//! Password policy enforcement for new passwords.

use gatehouse_core::config::PasswordPolicyConfig;
use gatehouse_core::error::AppError;

/// A pluggable strength predicate.
pub trait PasswordPolicy: Send + Sync + 'static {
    /// Returns `Ok(())` if the password is acceptable, or a validation error
    /// describing the first violation.
    fn check(&self, password: &str) -> Result<(), AppError>;

    /// Checks a replacement for `current`: it must differ from it and pass
    /// [`check`](Self::check).
    fn check_change(&self, current: &str, new_password: &str) -> Result<(), AppError> {
        validate_not_same(current, new_password)?;
        self.check(new_password)
    }
}

/// Validates that a new password differs from the old one.
pub fn validate_not_same(old_password: &str, new_password: &str) -> Result<(), AppError> {
    if old_password == new_password {
        return Err(AppError::validation(
            "New password must be different from the current password",
        ));
    }
    Ok(())
}

/// Character-class, length, and entropy rules driven by configuration.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    config: PasswordPolicyConfig,
}

impl PasswordValidator {
    /// Creates a new validator from the password policy section.
    pub fn new(config: &PasswordPolicyConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

impl PasswordPolicy for PasswordValidator {
    fn check(&self, password: &str) -> Result<(), AppError> {
        if password.chars().count() < self.config.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.config.min_length
            )));
        }

        if self.config.require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
            return Err(AppError::validation(
                "Password must contain at least one uppercase letter",
            ));
        }

        if self.config.require_lowercase && !password.chars().any(|c| c.is_lowercase()) {
            return Err(AppError::validation(
                "Password must contain at least one lowercase letter",
            ));
        }

        if self.config.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AppError::validation(
                "Password must contain at least one digit",
            ));
        }

        if self.config.require_symbol && !password.chars().any(|c| !c.is_alphanumeric()) {
            return Err(AppError::validation(
                "Password must contain at least one special character",
            ));
        }

        // zxcvbn scores run 0..=4; a minimum of 0 turns the check off.
        if self.config.min_strength_score > 0 {
            let estimate = zxcvbn::zxcvbn(password, &[]);
            if u8::from(estimate.score()) < self.config.min_strength_score {
                return Err(AppError::validation(
                    "Password is too weak. Please use a stronger password with more entropy.",
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_core::ErrorKind;

    fn validator() -> PasswordValidator {
        PasswordValidator::new(&PasswordPolicyConfig::default())
    }

    #[test]
    fn test_strong_password_passes() {
        assert!(validator().check("Tq8#vRz2!mWk4p").is_ok());
    }

    #[test]
    fn test_each_rule_reports() {
        let v = validator();
        for weak in ["Ab1-", "lower-case-1", "UPPER-CASE-1", "No-Digits-Here", "NoSymbols123"] {
            let err = v.check(weak).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Validation, "{weak}");
        }
    }

    #[test]
    fn test_guessable_password_rejected_on_entropy() {
        // Satisfies every character-class rule.
        let err = validator().check("Password1!").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.message.contains("too weak"));

        let lenient = PasswordValidator::new(&PasswordPolicyConfig {
            min_strength_score: 0,
            ..PasswordPolicyConfig::default()
        });
        assert!(lenient.check("Password1!").is_ok());
    }

    #[test]
    fn test_relaxed_policy() {
        let v = PasswordValidator::new(&PasswordPolicyConfig {
            min_length: 4,
            require_uppercase: false,
            require_lowercase: false,
            require_digit: false,
            require_symbol: false,
            min_strength_score: 0,
        });
        assert!(v.check("abcd").is_ok());
        assert!(v.check("abc").is_err());
    }

    #[test]
    fn test_reuse_rejected() {
        let v = validator();
        let same = v.check_change("Tq8#vRz2!mWk4p", "Tq8#vRz2!mWk4p").unwrap_err();
        assert!(same.message.contains("different"));
        assert!(v.check_change("Tq8#vRz2!mWk4p", "Lx5@hNf9$cJd3s").is_ok());
        assert!(validate_not_same("Same-Pass1", "Other-Pass1").is_ok());
    }
}
