//! Passphrase buffer with automatic zeroization

use zeroize::{Zeroize, ZeroizeOnDrop};

/// A passphrase returned by a secret store - automatically zeroed when dropped
///
/// Each load hands the caller an independent copy; neither the manager nor the
/// backend keeps a reference to it. Callers that take the inner `String` out
/// via [`Passphrase::into_inner`] own clearing it afterwards.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Passphrase {
    value: String,
}

impl Passphrase {
    /// Create a new passphrase buffer
    pub fn new(value: String) -> Self {
        Self { value }
    }

    /// Get the secret value (use carefully)
    pub fn expose(&self) -> &str {
        &self.value
    }

    /// Consume and return the inner value, leaving nothing behind to zeroize
    pub fn into_inner(mut self) -> String {
        std::mem::take(&mut self.value)
    }
}

impl Clone for Passphrase {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
        }
    }
}

impl From<&str> for Passphrase {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl std::fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Passphrase")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expose() {
        let passphrase = Passphrase::from("my-secret");
        assert_eq!(passphrase.expose(), "my-secret");
    }

    #[test]
    fn test_into_inner() {
        let passphrase = Passphrase::new("s3cr3t".to_string());
        assert_eq!(passphrase.into_inner(), "s3cr3t");
    }

    #[test]
    fn test_debug_redacted() {
        let passphrase = Passphrase::from("hunter2");
        let debug = format!("{:?}", passphrase);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("hunter2"));
    }
}
