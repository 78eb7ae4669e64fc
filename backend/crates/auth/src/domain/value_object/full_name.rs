//! Full Name Value Object

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AuthError, AuthResult};

/// Display name: trimmed, ASCII letters, whitespace, `-` and `'` only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FullName(String);

impl FullName {
    pub fn new(raw: impl AsRef<str>) -> AuthResult<Self> {
        let cleaned = raw.as_ref().trim();

        if cleaned.is_empty() {
            return Err(AuthError::Validation("Full name is required".to_string()));
        }

        let allowed = |c: char| c.is_ascii_alphabetic() || c.is_ascii_whitespace() || c == '-' || c == '\'';
        if !cleaned.chars().all(allowed) {
            return Err(AuthError::Validation(
                "Full name contains invalid characters".to_string(),
            ));
        }

        Ok(Self(cleaned.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for FullName {
    type Error = AuthError;

    fn try_from(value: String) -> AuthResult<Self> {
        FullName::new(value)
    }
}

impl From<FullName> for String {
    fn from(name: FullName) -> Self {
        name.0
    }
}

impl fmt::Display for FullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
