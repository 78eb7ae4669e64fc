//! Session Manager
//!
//! Owns the credential lifecycle: registration, login, refresh rotation,
//! profile lookup and logout. Each operation lives in its own module as an
//! `impl` block on [`SessionManager`]; this file holds the shared token
//! plumbing.

use std::sync::Arc;
use std::time::Duration;

use kernel::id::AccountId;
use platform::clock::Clock;
use platform::password::PasswordHasher;

use crate::application::config::AuthConfig;
use crate::domain::entity::{Account, Token, TokenKind, TokenPair};
use crate::domain::repository::{AccountRepository, TokenRepository};
use crate::domain::value_object::TokenValue;
use crate::error::{AuthError, AuthResult};

/// Result of a successful register or login
#[derive(Debug, Clone)]
pub struct SessionOutput {
    pub account: Account,
    pub tokens: TokenPair,
}

/// Session manager
///
/// Cheap to clone; every collaborator sits behind an `Arc`.
pub struct SessionManager<A, T, H>
where
    A: AccountRepository,
    T: TokenRepository,
    H: PasswordHasher,
{
    pub(crate) accounts: Arc<A>,
    pub(crate) tokens: Arc<T>,
    pub(crate) hasher: Arc<H>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) config: Arc<AuthConfig>,
}

impl<A, T, H> Clone for SessionManager<A, T, H>
where
    A: AccountRepository,
    T: TokenRepository,
    H: PasswordHasher,
{
    fn clone(&self) -> Self {
        Self {
            accounts: Arc::clone(&self.accounts),
            tokens: Arc::clone(&self.tokens),
            hasher: Arc::clone(&self.hasher),
            clock: Arc::clone(&self.clock),
            config: Arc::clone(&self.config),
        }
    }
}

impl<A, T, H> SessionManager<A, T, H>
where
    A: AccountRepository + Sync,
    T: TokenRepository + Sync,
    H: PasswordHasher,
{
    pub fn new(
        accounts: Arc<A>,
        tokens: Arc<T>,
        hasher: Arc<H>,
        clock: Arc<dyn Clock>,
        config: AuthConfig,
    ) -> Self {
        Self {
            accounts,
            tokens,
            hasher,
            clock,
            config: Arc::new(config),
        }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Owner of a live token of either kind, if any.
    ///
    /// Never deletes anything; an expired token is left for the operation
    /// that actually consumes it.
    pub async fn identify(&self, value: &str) -> Option<AccountId> {
        let token = self.tokens.find_by_value(value).await.ok()?;
        (!token.is_expired(self.clock.now())).then_some(token.owner)
    }

    /// Issue and store a fresh access + refresh pair.
    ///
    /// If the refresh token cannot be stored, the access token is removed
    /// again so the owner never ends up with half a pair.
    pub(crate) async fn issue_pair(&self, owner: AccountId) -> AuthResult<TokenPair> {
        let access = self
            .issue_token(owner, TokenKind::Access, self.config.access_token_ttl)
            .await?;

        match self
            .issue_token(owner, TokenKind::Refresh, self.config.refresh_token_ttl)
            .await
        {
            Ok(refresh) => Ok(TokenPair { access, refresh }),
            Err(e) => {
                self.tokens.delete(access.value.as_str()).await;
                Err(e)
            }
        }
    }

    async fn issue_token(
        &self,
        owner: AccountId,
        kind: TokenKind,
        ttl: Duration,
    ) -> AuthResult<Token> {
        let attempts = self.config.token_generation_attempts.max(1);

        for attempt in 1..=attempts {
            let token = Token::issue(TokenValue::generate()?, owner, kind, self.clock.now(), ttl)?;
            if self.tokens.insert_if_absent(&token).await? {
                return Ok(token);
            }
            tracing::warn!(account_id = %owner, kind = %kind, attempt, "Token value collision");
        }

        Err(AuthError::GenerationExhausted)
    }

    /// Look up a live token of the given kind.
    ///
    /// Unknown values and kind mismatches are `InvalidToken`. An expired
    /// token is deleted before `TokenExpired` is returned.
    pub(crate) async fn resolve_live(&self, value: &str, kind: TokenKind) -> AuthResult<Token> {
        let token = self.tokens.find_by_value(value).await.map_err(|e| match e {
            AuthError::TokenNotFound => AuthError::InvalidToken,
            other => other,
        })?;

        if token.kind != kind {
            return Err(AuthError::InvalidToken);
        }

        if token.is_expired(self.clock.now()) {
            self.tokens.delete(value).await;
            tracing::debug!(account_id = %token.owner, kind = %kind, "Expired token removed on lookup");
            return Err(AuthError::TokenExpired);
        }

        Ok(token)
    }

    /// Load the active owner of a token.
    pub(crate) async fn active_owner(&self, token: &Token) -> AuthResult<Account> {
        let account = self
            .accounts
            .find_by_id(&token.owner)
            .await
            .map_err(|e| match e {
                AuthError::AccountNotFound => AuthError::InvalidToken,
                other => other,
            })?;

        if !account.is_active {
            return Err(AuthError::AccountDeactivated);
        }

        Ok(account)
    }
}
