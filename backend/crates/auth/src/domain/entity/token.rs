//! Token Entity
//!
//! A token is live while it is stored and `now < expires_at`.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use kernel::id::AccountId;
use serde::{Deserialize, Serialize};

use crate::domain::value_object::TokenValue;
use crate::error::{AuthError, AuthResult};

/// Access token lifetime (15 minutes)
pub const ACCESS_TOKEN_TTL: Duration = Duration::from_secs(15 * 60);

/// Refresh token lifetime (7 days)
pub const REFRESH_TOKEN_TTL: Duration = Duration::from_secs(7 * 24 * 3600);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub value: TokenValue,
    pub owner: AccountId,
    pub kind: TokenKind,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Token {
    /// Expiry is fixed here, at issuance. `ttl` must be positive.
    pub fn issue(
        value: TokenValue,
        owner: AccountId,
        kind: TokenKind,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> AuthResult<Self> {
        let expires_at = TimeDelta::from_std(ttl)
            .ok()
            .filter(|ttl| *ttl > TimeDelta::zero())
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| AuthError::Internal(format!("invalid {kind} token lifetime")))?;

        Ok(Self {
            value,
            owner,
            kind,
            expires_at,
            created_at: now,
        })
    }

    #[inline]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Time left before expiry, zero once expired.
    pub fn remaining(&self, now: DateTime<Utc>) -> TimeDelta {
        (self.expires_at - now).max(TimeDelta::zero())
    }
}

/// Access + refresh token issued together for one owner.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: Token,
    pub refresh: Token,
}

impl TokenPair {
    pub fn owner(&self) -> AccountId {
        self.access.owner
    }

    /// Seconds until the access token expires.
    pub fn expires_in(&self, now: DateTime<Utc>) -> i64 {
        self.access.remaining(now).num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(kind: TokenKind, ttl: Duration) -> (Token, DateTime<Utc>) {
        let now = Utc::now();
        let token = Token::issue(
            TokenValue::generate().unwrap(),
            AccountId::new(),
            kind,
            now,
            ttl,
        )
        .unwrap();
        (token, now)
    }

    #[test]
    fn test_expiry_is_after_creation() {
        let (access, now) = token(TokenKind::Access, ACCESS_TOKEN_TTL);
        assert!(access.expires_at > access.created_at);
        assert_eq!(access.remaining(now), TimeDelta::minutes(15));

        let (refresh, now) = token(TokenKind::Refresh, REFRESH_TOKEN_TTL);
        assert_eq!(refresh.remaining(now), TimeDelta::days(7));
    }

    #[test]
    fn test_is_expired_at_boundary() {
        let (access, now) = token(TokenKind::Access, ACCESS_TOKEN_TTL);
        assert!(!access.is_expired(now + TimeDelta::minutes(15) - TimeDelta::milliseconds(1)));
        assert!(access.is_expired(now + TimeDelta::minutes(15)));
        assert_eq!(access.remaining(now + TimeDelta::hours(1)), TimeDelta::zero());
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let result = Token::issue(
            TokenValue::generate().unwrap(),
            AccountId::new(),
            TokenKind::Access,
            Utc::now(),
            Duration::ZERO,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_out_of_range_ttl_rejected() {
        // Far past the last representable date
        let ttl = Duration::from_secs(400_000 * 365 * 24 * 3600);
        let result = Token::issue(
            TokenValue::generate().unwrap(),
            AccountId::new(),
            TokenKind::Refresh,
            Utc::now(),
            ttl,
        );
        assert!(matches!(result, Err(AuthError::Internal(_))));
    }
}
