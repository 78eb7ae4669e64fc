//! Register
//!
//! Creates an account and signs it in with a first token pair.

use platform::password::{ClearTextPassword, PasswordHasher};

use crate::application::session_manager::{SessionManager, SessionOutput};
use crate::domain::entity::{Account, NewAccount};
use crate::domain::repository::{AccountRepository, TokenRepository};
use crate::domain::value_object::{DateOfBirth, Email, FullName, Gender, RegistrationMethod};
use crate::error::{AuthError, AuthResult};

/// Register input
pub struct RegisterInput {
    pub email: String,
    pub full_name: String,
    pub gender: Gender,
    /// ISO calendar date (`YYYY-MM-DD`)
    pub date_of_birth: String,
    pub registration_method: RegistrationMethod,
    /// Required for email registration, refused for OAuth
    pub password: Option<String>,
}

impl<A, T, H> SessionManager<A, T, H>
where
    A: AccountRepository + Sync,
    T: TokenRepository + Sync,
    H: PasswordHasher,
{
    pub async fn register(&self, input: RegisterInput) -> AuthResult<SessionOutput> {
        let email = Email::new(&input.email)?;

        // Fast path only; insert_if_absent below is what guarantees uniqueness
        if self.accounts.exists_by_email(&email).await {
            return Err(AuthError::EmailAlreadyRegistered);
        }

        let full_name = FullName::new(&input.full_name)?;

        let now = self.clock.now();
        let date_of_birth = DateOfBirth::parse(&input.date_of_birth, now.date_naive())?;

        let password = input.password.filter(|p| !p.is_empty());
        let password_hash = match (input.registration_method.is_oauth(), password) {
            (false, None) => {
                return Err(AuthError::Validation(
                    "Password is required for email registration".to_string(),
                ));
            }
            (false, Some(raw)) => {
                let password = ClearTextPassword::new(raw)?;
                Some(self.hasher.hash(&password)?)
            }
            (true, Some(_)) => {
                return Err(AuthError::InvalidRegistrationMethod(
                    "Password should not be provided for OAuth registration".to_string(),
                ));
            }
            (true, None) => None,
        };

        let account = Account::register(
            NewAccount {
                email,
                full_name,
                gender: input.gender,
                date_of_birth,
                registration_method: input.registration_method,
            },
            password_hash,
            now,
        )?;

        self.accounts.insert_if_absent(&account).await?;
        let tokens = self.issue_pair(account.id).await?;

        tracing::info!(
            account_id = %account.id,
            method = %account.registration_method(),
            "Account registered"
        );

        Ok(SessionOutput { account, tokens })
    }
}
