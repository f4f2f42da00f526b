use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Wrapper for secrets (passwords, client secrets, access tokens).
///
/// The memory is zeroed on drop, `Debug` never shows the value and `Display`
/// only shows a masked form, so a `SecureString` can be logged safely.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecureString(String);

impl SecureString {
    /// Wraps a secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the secret.
    ///
    /// Keep the returned reference short-lived, and never log it.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Masks the value: short secrets are fully hidden, longer ones keep
    /// their first and last four characters.
    fn masked(&self) -> String {
        let count = self.0.chars().count();
        if count <= 8 {
            return "***".to_string();
        }
        let head = self.0.chars().take(4).collect::<String>();
        let tail = self.0.chars().skip(count - 4).collect::<String>();
        format!("{head}...{tail}")
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SecureString").field(&"[REDACTED]").finish()
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_redact_debug() {
        let secret = SecureString::new("hunter2-but-longer");
        let debug = format!("{secret:?}");

        assert_eq!(debug, r#"SecureString("[REDACTED]")"#);
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn should_mask_display() {
        assert_eq!(SecureString::new("short").to_string(), "***");
        assert_eq!(SecureString::new("12345678").to_string(), "***");
        assert_eq!(SecureString::new("123456789").to_string(), "1234...6789");
    }

    #[test]
    fn should_mask_multibyte_secrets_without_panicking() {
        let secret = SecureString::new("mot-de-passé-très-secret");
        assert_eq!(secret.to_string(), "mot-...cret");
    }

    #[test]
    fn should_expose_value() {
        let secret: SecureString = "value".into();
        assert_eq!(secret.expose(), "value");
        assert!(!secret.is_empty());
        assert!(SecureString::from(String::new()).is_empty());
    }
}
