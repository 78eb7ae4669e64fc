//! Profile

use platform::password::PasswordHasher;

use crate::application::session_manager::SessionManager;
use crate::domain::entity::{Account, TokenKind};
use crate::domain::repository::{AccountRepository, TokenRepository};
use crate::error::AuthResult;

impl<A, T, H> SessionManager<A, T, H>
where
    A: AccountRepository + Sync,
    T: TokenRepository + Sync,
    H: PasswordHasher,
{
    /// Account behind a live access token.
    pub async fn get_profile(&self, access_value: &str) -> AuthResult<Account> {
        let token = self.resolve_live(access_value, TokenKind::Access).await?;
        self.active_owner(&token).await
    }
}
