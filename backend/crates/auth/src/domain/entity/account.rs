//! Account Entity

use chrono::{DateTime, Utc};
use kernel::id::AccountId;
use platform::password::HashedPassword;

use crate::domain::value_object::{
    DateOfBirth, Email, FullName, Gender, RegistrationMethod,
};
use crate::error::{AuthError, AuthResult};

/// Validated registration data, before an identifier is assigned.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: Email,
    pub full_name: FullName,
    pub gender: Gender,
    pub date_of_birth: DateOfBirth,
    pub registration_method: RegistrationMethod,
}

/// Account entity
///
/// A password hash is present exactly when the account registered by
/// email. OAuth accounts never carry one.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    /// Normalized, unique across accounts
    pub email: Email,
    pub full_name: FullName,
    pub gender: Gender,
    pub date_of_birth: DateOfBirth,
    registration_method: RegistrationMethod,
    password_hash: Option<HashedPassword>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create an active account with a freshly allocated identifier.
    pub fn register(
        new: NewAccount,
        password_hash: Option<HashedPassword>,
        now: DateTime<Utc>,
    ) -> AuthResult<Self> {
        match (new.registration_method.is_oauth(), password_hash.is_some()) {
            (false, false) => {
                return Err(AuthError::Validation(
                    "Password is required for email registration".to_string(),
                ));
            }
            (true, true) => {
                return Err(AuthError::InvalidRegistrationMethod(
                    "Password should not be provided for OAuth registration".to_string(),
                ));
            }
            _ => {}
        }

        Ok(Self {
            id: AccountId::new(),
            email: new.email,
            full_name: new.full_name,
            gender: new.gender,
            date_of_birth: new.date_of_birth,
            registration_method: new.registration_method,
            password_hash,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn registration_method(&self) -> RegistrationMethod {
        self.registration_method
    }

    pub fn password_hash(&self) -> Option<&HashedPassword> {
        self.password_hash.as_ref()
    }

    pub fn can_login(&self) -> bool {
        self.is_active
    }
}
