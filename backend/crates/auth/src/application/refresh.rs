//! Refresh
//!
//! One-time-use rotation of a refresh token.

use platform::password::PasswordHasher;

use crate::application::session_manager::SessionManager;
use crate::domain::entity::{TokenKind, TokenPair};
use crate::domain::repository::{AccountRepository, TokenRepository};
use crate::error::{AuthError, AuthResult};

impl<A, T, H> SessionManager<A, T, H>
where
    A: AccountRepository + Sync,
    T: TokenRepository + Sync,
    H: PasswordHasher,
{
    /// Exchange a live refresh token for a new pair.
    ///
    /// The presented refresh token is deleted only after the new pair is
    /// stored. The access token issued alongside it stays live until it
    /// expires.
    ///
    /// Of two concurrent calls with the same value, only the one whose
    /// delete removes the token keeps its pair; the other call's pair is
    /// withdrawn and it fails with `InvalidToken`.
    pub async fn refresh_token(&self, refresh_value: &str) -> AuthResult<TokenPair> {
        let presented = self.resolve_live(refresh_value, TokenKind::Refresh).await?;
        let account = self.active_owner(&presented).await?;

        let tokens = self.issue_pair(account.id).await?;
        if !self.tokens.delete(refresh_value).await {
            self.tokens.delete(tokens.access.value.as_str()).await;
            self.tokens.delete(tokens.refresh.value.as_str()).await;
            tracing::warn!(account_id = %account.id, "Refresh token already consumed");
            return Err(AuthError::InvalidToken);
        }

        tracing::info!(account_id = %account.id, "Refresh token rotated");

        Ok(tokens)
    }
}
