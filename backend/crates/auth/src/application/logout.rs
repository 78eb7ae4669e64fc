//! Logout
//!
//! Global sign-out: every token the owner holds is revoked, on every
//! device.

use platform::password::PasswordHasher;

use crate::application::session_manager::SessionManager;
use crate::domain::entity::TokenKind;
use crate::domain::repository::{AccountRepository, TokenRepository};
use crate::error::{AuthError, AuthResult};

impl<A, T, H> SessionManager<A, T, H>
where
    A: AccountRepository + Sync,
    T: TokenRepository + Sync,
    H: PasswordHasher,
{
    /// Any stored token resolves the owner; its kind and expiry are not
    /// checked.
    pub async fn logout(&self, token_value: &str) -> AuthResult<()> {
        let token = self
            .tokens
            .find_by_value(token_value)
            .await
            .map_err(|e| match e {
                AuthError::TokenNotFound => AuthError::InvalidToken,
                other => other,
            })?;

        let owner = token.owner;
        let access = self.tokens.delete_all_for_owner(&owner, TokenKind::Access).await;
        let refresh = self.tokens.delete_all_for_owner(&owner, TokenKind::Refresh).await;

        tracing::info!(account_id = %owner, access, refresh, "Account logged out");

        Ok(())
    }
}
