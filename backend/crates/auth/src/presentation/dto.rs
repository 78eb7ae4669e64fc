//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::{Account, TokenPair};
use crate::domain::value_object::{Gender, RegistrationMethod};

// ============================================================================
// Register
// ============================================================================

/// Register request
///
/// Enum-like fields stay strings here so that validation can report every
/// problem at once instead of failing on the first bad variant.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub gender: String,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub registration_method: String,
    pub password: Option<String>,
}

// ============================================================================
// Login
// ============================================================================

/// Login request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

// ============================================================================
// Refresh / Logout
// ============================================================================

/// Body of both refresh and logout
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[serde(default)]
    pub refresh_token: String,
}

// ============================================================================
// Responses
// ============================================================================

/// Public view of an account
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub gender: Gender,
    /// `YYYY-MM-DD`
    pub date_of_birth: String,
    pub registration_method: RegistrationMethod,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Account> for UserResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.to_string(),
            email: account.email.as_str().to_string(),
            full_name: account.full_name.as_str().to_string(),
            gender: account.gender,
            date_of_birth: account.date_of_birth.to_string(),
            registration_method: account.registration_method(),
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// Register and login response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
    /// Seconds until the access token expires
    pub expires_in: i64,
}

/// Refresh response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

impl RefreshResponse {
    pub fn new(tokens: &TokenPair, now: DateTime<Utc>) -> Self {
        Self {
            access_token: tokens.access.value.as_str().to_string(),
            refresh_token: tokens.refresh.value.as_str().to_string(),
            expires_in: tokens.expires_in(now),
        }
    }
}

impl AuthResponse {
    pub fn new(account: &Account, tokens: &TokenPair, now: DateTime<Utc>) -> Self {
        let RefreshResponse {
            access_token,
            refresh_token,
            expires_in,
        } = RefreshResponse::new(tokens, now);

        Self {
            user: UserResponse::from(account),
            access_token,
            refresh_token,
            expires_in,
        }
    }
}
