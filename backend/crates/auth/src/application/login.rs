//! Login
//!
//! Email + password authentication. A successful login revokes every
//! refresh token the account held before.

use platform::password::{ClearTextPassword, PasswordHasher};

use crate::application::session_manager::{SessionManager, SessionOutput};
use crate::domain::entity::TokenKind;
use crate::domain::repository::{AccountRepository, TokenRepository};
use crate::domain::value_object::Email;
use crate::error::{AuthError, AuthResult};

/// Login input
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

impl<A, T, H> SessionManager<A, T, H>
where
    A: AccountRepository + Sync,
    T: TokenRepository + Sync,
    H: PasswordHasher,
{
    pub async fn login(&self, input: LoginInput) -> AuthResult<SessionOutput> {
        // A malformed email cannot belong to anyone
        let email = Email::new(&input.email).map_err(|_| AuthError::InvalidCredentials)?;

        let account = self
            .accounts
            .find_by_email(&email)
            .await
            .map_err(|e| match e {
                AuthError::AccountNotFound => AuthError::InvalidCredentials,
                other => other,
            })?;

        if !account.can_login() {
            return Err(AuthError::AccountDeactivated);
        }

        if account.registration_method().is_oauth() {
            return Err(AuthError::WrongAuthMethod);
        }

        let Some(hash) = account.password_hash() else {
            return Err(AuthError::Internal(format!(
                "account {} has no password hash",
                account.id
            )));
        };

        let password = ClearTextPassword::for_verification(input.password);
        if !self.hasher.verify(&password, hash) {
            tracing::warn!(account_id = %account.id, "Password verification failed");
            return Err(AuthError::InvalidCredentials);
        }

        let revoked = self
            .tokens
            .delete_all_for_owner(&account.id, TokenKind::Refresh)
            .await;
        let tokens = self.issue_pair(account.id).await?;

        tracing::info!(account_id = %account.id, revoked, "Account logged in");

        Ok(SessionOutput { account, tokens })
    }
}
