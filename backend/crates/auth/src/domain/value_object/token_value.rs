//! Token Value Object
//!
//! Opaque credential value: 256 random bits as 64 lowercase hex chars.

use std::borrow::Borrow;
use std::fmt;

use platform::crypto::{CryptoError, random_token_hex};

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TokenValue(String);

impl TokenValue {
    /// Draw a fresh value from the OS CSPRNG.
    pub fn generate() -> Result<Self, CryptoError> {
        random_token_hex().map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TokenValue {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for TokenValue {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Values are bearer credentials: keep them out of logs
impl fmt::Debug for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = self.0.get(..8).unwrap_or("");
        write!(f, "TokenValue({prefix}…)")
    }
}
