//! Repository Traits
//!
//! Interfaces for account and token storage. Each call is atomic on its
//! own; nothing is atomic across calls.

use kernel::id::AccountId;

use crate::domain::entity::{Account, Token, TokenKind};
use crate::domain::value_object::Email;
use crate::error::AuthResult;

/// Account repository trait
#[trait_variant::make(AccountRepository: Send)]
pub trait LocalAccountRepository {
    /// Upsert by identifier
    async fn save(&self, account: &Account) -> AuthResult<()>;

    /// Insert unless the normalized email is already taken, in one step.
    ///
    /// Fails with `EmailAlreadyRegistered` on conflict.
    async fn insert_if_absent(&self, account: &Account) -> AuthResult<()>;

    /// Fails with `AccountNotFound` if absent
    async fn find_by_email(&self, email: &Email) -> AuthResult<Account>;

    /// Fails with `AccountNotFound` if absent
    async fn find_by_id(&self, id: &AccountId) -> AuthResult<Account>;

    async fn exists_by_email(&self, email: &Email) -> bool;
}

/// Token repository trait
#[trait_variant::make(TokenRepository: Send)]
pub trait LocalTokenRepository {
    /// Upsert by value
    async fn save(&self, token: &Token) -> AuthResult<()>;

    /// Store unless a live token already holds this value.
    ///
    /// Returns `false` on collision. An expired holder is replaced.
    async fn insert_if_absent(&self, token: &Token) -> AuthResult<bool>;

    /// Fails with `TokenNotFound` if absent
    async fn find_by_value(&self, value: &str) -> AuthResult<Token>;

    /// Idempotent. Returns whether a token was removed.
    async fn delete(&self, value: &str) -> bool;

    /// Bulk revocation. Returns how many tokens were removed.
    async fn delete_all_for_owner(&self, owner: &AccountId, kind: TokenKind) -> usize;

    async fn find_by_owner(&self, owner: &AccountId, kind: TokenKind) -> Vec<Token>;

    /// Sweep every token whose expiry has passed
    async fn delete_expired(&self) -> usize;
}
