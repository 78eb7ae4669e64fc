//! In-memory repository implementations
//!
//! Each store keeps its primary map and secondary index behind one
//! `RwLock`, so an operation observes and mutates both consistently.
//! Locks are held only for the duration of a single call.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use kernel::id::AccountId;
use platform::clock::Clock;
use platform::task::PeriodicTask;
use tokio::sync::RwLock;

use crate::domain::entity::{Account, Token, TokenKind};
use crate::domain::repository::{AccountRepository, TokenRepository};
use crate::domain::value_object::{Email, TokenValue};
use crate::error::{AuthError, AuthResult};

// ============================================================================
// Accounts
// ============================================================================

#[derive(Debug, Default)]
struct AccountTables {
    by_id: HashMap<AccountId, Account>,
    /// normalized email -> id
    by_email: HashMap<String, AccountId>,
}

impl AccountTables {
    fn upsert(&mut self, account: &Account) {
        if let Some(previous) = self.by_id.get(&account.id) {
            if previous.email != account.email {
                self.by_email.remove(previous.email.as_str());
            }
        }
        self.by_email
            .insert(account.email.as_str().to_owned(), account.id);
        self.by_id.insert(account.id, account.clone());
    }
}

#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    tables: RwLock<AccountTables>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.tables.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tables.read().await.by_id.is_empty()
    }
}

impl AccountRepository for InMemoryAccountStore {
    async fn save(&self, account: &Account) -> AuthResult<()> {
        self.tables.write().await.upsert(account);
        Ok(())
    }

    async fn insert_if_absent(&self, account: &Account) -> AuthResult<()> {
        let mut tables = self.tables.write().await;
        if tables.by_email.contains_key(account.email.as_str()) {
            return Err(AuthError::EmailAlreadyRegistered);
        }
        tables.upsert(account);
        Ok(())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Account> {
        let tables = self.tables.read().await;
        tables
            .by_email
            .get(email.as_str())
            .and_then(|id| tables.by_id.get(id))
            .cloned()
            .ok_or(AuthError::AccountNotFound)
    }

    async fn find_by_id(&self, id: &AccountId) -> AuthResult<Account> {
        self.tables
            .read()
            .await
            .by_id
            .get(id)
            .cloned()
            .ok_or(AuthError::AccountNotFound)
    }

    async fn exists_by_email(&self, email: &Email) -> bool {
        self.tables
            .read()
            .await
            .by_email
            .contains_key(email.as_str())
    }
}

// ============================================================================
// Tokens
// ============================================================================

#[derive(Debug, Default)]
struct TokenTables {
    by_value: HashMap<TokenValue, Token>,
    by_owner: HashMap<(AccountId, TokenKind), HashSet<TokenValue>>,
}

impl TokenTables {
    fn insert(&mut self, token: &Token) {
        if let Some(previous) = self.by_value.insert(token.value.clone(), token.clone()) {
            self.unindex(&previous);
        }
        self.by_owner
            .entry((token.owner, token.kind))
            .or_default()
            .insert(token.value.clone());
    }

    fn remove(&mut self, value: &str) -> Option<Token> {
        let token = self.by_value.remove(value)?;
        self.unindex(&token);
        Some(token)
    }

    fn unindex(&mut self, token: &Token) {
        let key = (token.owner, token.kind);
        if let Some(values) = self.by_owner.get_mut(&key) {
            values.remove(token.value.as_str());
            if values.is_empty() {
                self.by_owner.remove(&key);
            }
        }
    }
}

#[derive(Debug)]
pub struct InMemoryTokenStore {
    tables: RwLock<TokenTables>,
    clock: Arc<dyn Clock>,
}

impl InMemoryTokenStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: RwLock::new(TokenTables::default()),
            clock,
        }
    }

    pub async fn len(&self) -> usize {
        self.tables.read().await.by_value.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tables.read().await.by_value.is_empty()
    }

    /// Periodically sweep expired tokens. Stops when the handle is
    /// dropped or stopped.
    pub fn spawn_expiry_sweep(self: &Arc<Self>, interval: Duration) -> PeriodicTask {
        let store = Arc::clone(self);
        PeriodicTask::spawn("token_expiry_sweep", interval, move || {
            let store = Arc::clone(&store);
            async move {
                let removed = store.delete_expired().await;
                if removed > 0 {
                    tracing::info!(tokens_deleted = removed, "Cleaned up expired tokens");
                }
            }
        })
    }
}

impl TokenRepository for InMemoryTokenStore {
    async fn save(&self, token: &Token) -> AuthResult<()> {
        self.tables.write().await.insert(token);
        Ok(())
    }

    async fn insert_if_absent(&self, token: &Token) -> AuthResult<bool> {
        let now = self.clock.now();
        let mut tables = self.tables.write().await;
        let taken = tables
            .by_value
            .get(token.value.as_str())
            .is_some_and(|holder| !holder.is_expired(now));
        if taken {
            return Ok(false);
        }
        tables.insert(token);
        Ok(true)
    }

    async fn find_by_value(&self, value: &str) -> AuthResult<Token> {
        self.tables
            .read()
            .await
            .by_value
            .get(value)
            .cloned()
            .ok_or(AuthError::TokenNotFound)
    }

    async fn delete(&self, value: &str) -> bool {
        self.tables.write().await.remove(value).is_some()
    }

    async fn delete_all_for_owner(&self, owner: &AccountId, kind: TokenKind) -> usize {
        let mut tables = self.tables.write().await;
        let Some(values) = tables.by_owner.remove(&(*owner, kind)) else {
            return 0;
        };
        for value in &values {
            tables.by_value.remove(value.as_str());
        }
        values.len()
    }

    async fn find_by_owner(&self, owner: &AccountId, kind: TokenKind) -> Vec<Token> {
        let tables = self.tables.read().await;
        tables
            .by_owner
            .get(&(*owner, kind))
            .into_iter()
            .flatten()
            .filter_map(|value| tables.by_value.get(value.as_str()).cloned())
            .collect()
    }

    async fn delete_expired(&self) -> usize {
        let now = self.clock.now();
        let mut tables = self.tables.write().await;
        let expired: Vec<TokenValue> = tables
            .by_value
            .values()
            .filter(|token| token.is_expired(now))
            .map(|token| token.value.clone())
            .collect();
        for value in &expired {
            tables.remove(value.as_str());
        }
        expired.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::NewAccount;
    use crate::domain::entity::token::{ACCESS_TOKEN_TTL, REFRESH_TOKEN_TTL};
    use crate::domain::value_object::{DateOfBirth, FullName, Gender, RegistrationMethod};
    use chrono::{NaiveDate, TimeDelta};
    use platform::clock::ManualClock;

    fn oauth_account(email: &str) -> Account {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let new = NewAccount {
            email: Email::new(email).unwrap(),
            full_name: FullName::new("Grace Hopper").unwrap(),
            gender: Gender::Female,
            date_of_birth: DateOfBirth::parse("1990-01-01", today).unwrap(),
            registration_method: RegistrationMethod::Google,
        };
        Account::register(new, None, chrono::Utc::now()).unwrap()
    }

    fn token_store() -> (Arc<InMemoryTokenStore>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        (Arc::new(InMemoryTokenStore::new(clock.clone())), clock)
    }

    fn issue(clock: &ManualClock, owner: AccountId, kind: TokenKind) -> Token {
        let ttl = match kind {
            TokenKind::Access => ACCESS_TOKEN_TTL,
            TokenKind::Refresh => REFRESH_TOKEN_TTL,
        };
        Token::issue(TokenValue::generate().unwrap(), owner, kind, clock.now(), ttl).unwrap()
    }

    #[tokio::test]
    async fn test_account_lookup_by_email_and_id() {
        let store = InMemoryAccountStore::new();
        let account = oauth_account("grace@example.com");
        store.save(&account).await.unwrap();

        let email = Email::new("GRACE@example.com").unwrap();
        assert!(store.exists_by_email(&email).await);
        assert_eq!(store.find_by_email(&email).await.unwrap().id, account.id);
        assert_eq!(
            store.find_by_id(&account.id).await.unwrap().email,
            account.email
        );
    }

    #[tokio::test]
    async fn test_account_missing_is_not_found() {
        let store = InMemoryAccountStore::new();
        let email = Email::new("nobody@example.com").unwrap();
        assert!(!store.exists_by_email(&email).await);
        assert!(matches!(
            store.find_by_email(&email).await,
            Err(AuthError::AccountNotFound)
        ));
        assert!(matches!(
            store.find_by_id(&AccountId::new()).await,
            Err(AuthError::AccountNotFound)
        ));
    }

    #[tokio::test]
    async fn test_insert_if_absent_rejects_duplicate_email() {
        let store = InMemoryAccountStore::new();
        store
            .insert_if_absent(&oauth_account("dup@example.com"))
            .await
            .unwrap();
        let err = store
            .insert_if_absent(&oauth_account("dup@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailAlreadyRegistered));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_insert_if_absent_admits_one() {
        let store = Arc::new(InMemoryAccountStore::new());
        let mut handles = Vec::new();
        for _ in 0..32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .insert_if_absent(&oauth_account("race@example.com"))
                    .await
                    .is_ok()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_save_reindexes_changed_email() {
        let store = InMemoryAccountStore::new();
        let mut account = oauth_account("old@example.com");
        store.save(&account).await.unwrap();

        account.email = Email::new("new@example.com").unwrap();
        store.save(&account).await.unwrap();

        assert!(!store.exists_by_email(&Email::new("old@example.com").unwrap()).await);
        assert!(store.exists_by_email(&Email::new("new@example.com").unwrap()).await);
    }

    #[tokio::test]
    async fn test_token_find_and_delete_is_idempotent() {
        let (store, clock) = token_store();
        let token = issue(&clock, AccountId::new(), TokenKind::Access);
        store.save(&token).await.unwrap();

        let found = store.find_by_value(token.value.as_str()).await.unwrap();
        assert_eq!(found.owner, token.owner);

        assert!(store.delete(token.value.as_str()).await);
        assert!(!store.delete(token.value.as_str()).await);
        assert!(matches!(
            store.find_by_value(token.value.as_str()).await,
            Err(AuthError::TokenNotFound)
        ));
    }

    #[tokio::test]
    async fn test_delete_all_for_owner_is_scoped_by_kind() {
        let (store, clock) = token_store();
        let owner = AccountId::new();
        let other = AccountId::new();

        for _ in 0..3 {
            store.save(&issue(&clock, owner, TokenKind::Refresh)).await.unwrap();
        }
        let access = issue(&clock, owner, TokenKind::Access);
        store.save(&access).await.unwrap();
        store.save(&issue(&clock, other, TokenKind::Refresh)).await.unwrap();

        assert_eq!(store.delete_all_for_owner(&owner, TokenKind::Refresh).await, 3);
        assert!(store.find_by_owner(&owner, TokenKind::Refresh).await.is_empty());
        assert_eq!(store.find_by_owner(&owner, TokenKind::Access).await.len(), 1);
        assert_eq!(store.find_by_owner(&other, TokenKind::Refresh).await.len(), 1);
        assert_eq!(store.delete_all_for_owner(&owner, TokenKind::Refresh).await, 0);
    }

    #[tokio::test]
    async fn test_insert_if_absent_respects_live_holder() {
        let (store, clock) = token_store();
        let owner = AccountId::new();
        let first = issue(&clock, owner, TokenKind::Access);
        assert!(store.insert_if_absent(&first).await.unwrap());

        let mut collision = issue(&clock, AccountId::new(), TokenKind::Access);
        collision.value = first.value.clone();
        assert!(!store.insert_if_absent(&collision).await.unwrap());

        // Once the holder expires its value may be reused
        clock.advance(TimeDelta::minutes(16));
        let mut reuse = issue(&clock, AccountId::new(), TokenKind::Access);
        reuse.value = first.value.clone();
        assert!(store.insert_if_absent(&reuse).await.unwrap());
        assert!(store.find_by_owner(&owner, TokenKind::Access).await.is_empty());
        assert_eq!(
            store.find_by_value(first.value.as_str()).await.unwrap().owner,
            reuse.owner
        );
    }

    #[tokio::test]
    async fn test_delete_expired_sweeps_only_expired() {
        let (store, clock) = token_store();
        let owner = AccountId::new();
        store.save(&issue(&clock, owner, TokenKind::Access)).await.unwrap();
        store.save(&issue(&clock, owner, TokenKind::Refresh)).await.unwrap();

        clock.advance(TimeDelta::minutes(15));
        assert_eq!(store.delete_expired().await, 1);
        assert_eq!(store.len().await, 1);
        assert!(store.find_by_owner(&owner, TokenKind::Access).await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_sweep_task() {
        let (store, clock) = token_store();
        store
            .save(&issue(&clock, AccountId::new(), TokenKind::Access))
            .await
            .unwrap();
        clock.advance(TimeDelta::hours(1));

        let sweep = store.spawn_expiry_sweep(Duration::from_secs(300));
        tokio::time::sleep(Duration::from_secs(301)).await;
        assert!(store.is_empty().await);
        sweep.stop().await;
    }
}
