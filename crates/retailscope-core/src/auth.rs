//! Demo login check.
//!
//! This is a gate for a demo dashboard, not an identity system: one configured
//! username/password pair, no lockout, no credential store.

use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::app_config::AppConfig;
use crate::sanitize::sanitize_input;

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    #[error("Username must be at least {MIN_USERNAME_LEN} characters")]
    UsernameTooShort,

    #[error("Password must be at least {MIN_PASSWORD_LEN} characters")]
    PasswordTooShort,

    /// Deliberately does not say which field was wrong.
    #[error("Invalid username or password")]
    InvalidCredentials,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub username: String,
}

/// The configured demo username/password pair.
#[derive(Clone)]
pub struct DemoCredentials {
    username: String,
    password: String,
}

impl std::fmt::Debug for DemoCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DemoCredentials")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

impl DemoCredentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.demo_username.clone(), config.demo_password.clone())
    }

    /// Sanitizes both fields, enforces minimum lengths, then compares against
    /// the configured pair (case-sensitive).
    ///
    /// # Errors
    ///
    /// Returns [`LoginError::UsernameTooShort`] / [`LoginError::PasswordTooShort`]
    /// for length failures and [`LoginError::InvalidCredentials`] on mismatch.
    pub fn verify(&self, username: &str, password: &str) -> Result<AuthenticatedUser, LoginError> {
        let username = sanitize_input(username);
        let password = sanitize_input(password);

        if username.chars().count() < MIN_USERNAME_LEN {
            return Err(LoginError::UsernameTooShort);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(LoginError::PasswordTooShort);
        }

        // Both comparisons always run so timing does not reveal which field failed.
        let user_ok = username.as_bytes().ct_eq(self.username.as_bytes());
        let pass_ok = password.as_bytes().ct_eq(self.password.as_bytes());
        if bool::from(user_ok & pass_ok) {
            Ok(AuthenticatedUser { username })
        } else {
            Err(LoginError::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo() -> DemoCredentials {
        DemoCredentials::new("admin", "demo123")
    }

    #[test]
    fn accepts_exact_pair() {
        let user = demo().verify("admin", "demo123").expect("valid login");
        assert_eq!(user.username, "admin");
    }

    #[test]
    fn password_is_case_sensitive() {
        assert_eq!(
            demo().verify("admin", "Demo123"),
            Err(LoginError::InvalidCredentials)
        );
    }

    #[test]
    fn username_is_case_sensitive() {
        assert_eq!(
            demo().verify("Admin", "demo123"),
            Err(LoginError::InvalidCredentials)
        );
    }

    #[test]
    fn mismatch_message_does_not_name_a_field() {
        let wrong_user = demo().verify("nobody", "demo123").unwrap_err();
        let wrong_pass = demo().verify("admin", "nope-nope").unwrap_err();
        assert_eq!(wrong_user, wrong_pass);
        assert_eq!(wrong_user.to_string(), "Invalid username or password");
    }

    #[test]
    fn surrounding_whitespace_is_trimmed_before_compare() {
        assert!(demo().verify("  admin ", "demo123\n").is_ok());
    }

    #[test]
    fn markup_is_sanitized_before_compare() {
        assert!(demo().verify("<admin>", "demo123").is_ok());
    }

    #[test]
    fn short_fields_fail_validation_first() {
        assert_eq!(demo().verify("ad", "demo123"), Err(LoginError::UsernameTooShort));
        assert_eq!(demo().verify("admin", "demo"), Err(LoginError::PasswordTooShort));
        assert_eq!(
            demo().verify("<<a>>", "demo123"),
            Err(LoginError::UsernameTooShort)
        );
    }

    #[test]
    fn debug_redacts_password() {
        let rendered = format!("{:?}", demo());
        assert!(!rendered.contains("demo123"));
    }
}
