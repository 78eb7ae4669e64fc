//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use crate::domain::entity::token::{ACCESS_TOKEN_TTL, REFRESH_TOKEN_TTL};

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// Access token lifetime (15 minutes)
    pub access_token_ttl: Duration,
    /// Refresh token lifetime (7 days)
    pub refresh_token_ttl: Duration,
    /// Tries per token before giving up on an unused value
    pub token_generation_attempts: u32,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_ttl: ACCESS_TOKEN_TTL,
            refresh_token_ttl: REFRESH_TOKEN_TTL,
            token_generation_attempts: 5,
            password_pepper: None,
        }
    }
}

impl AuthConfig {
    /// Default lifetimes with an application pepper. Empty means none.
    pub fn with_pepper(pepper: impl Into<Vec<u8>>) -> Self {
        let pepper = pepper.into();
        Self {
            password_pepper: (!pepper.is_empty()).then_some(pepper),
            ..Default::default()
        }
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("token_generation_attempts", &self.token_generation_attempts)
            .field("password_pepper", &self.password_pepper.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
