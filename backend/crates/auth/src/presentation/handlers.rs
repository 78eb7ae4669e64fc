//! HTTP Handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use platform::password::PasswordHasher;
use platform::rate_limit::RateLimiter;

use crate::application::{LoginInput, RegisterInput, SessionManager};
use crate::domain::repository::{AccountRepository, TokenRepository};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    AuthResponse, LoginRequest, RefreshResponse, RefreshTokenRequest, RegisterRequest,
    UserResponse,
};
use crate::presentation::middleware::bearer_token;
use crate::presentation::validation::{Validate, validate};

/// Shared state for auth handlers and gates
pub struct AuthAppState<A, T, H>
where
    A: AccountRepository,
    T: TokenRepository,
    H: PasswordHasher,
{
    pub session: SessionManager<A, T, H>,
    pub limiter: Arc<RateLimiter>,
}

impl<A, T, H> Clone for AuthAppState<A, T, H>
where
    A: AccountRepository,
    T: TokenRepository,
    H: PasswordHasher,
{
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            limiter: Arc::clone(&self.limiter),
        }
    }
}

/// Unwrap a JSON body and run its validation table
fn accept<R: Validate>(payload: Result<Json<R>, JsonRejection>) -> AuthResult<R> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected request body");
        AuthError::InvalidRequest("Invalid request body".to_string())
    })?;

    validate(&request)?;
    Ok(request)
}

// ============================================================================
// Register
// ============================================================================

/// POST /api/v1/auth/register
pub async fn register<A, T, H>(
    State(state): State<AuthAppState<A, T, H>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse>
where
    A: AccountRepository + Sync + 'static,
    T: TokenRepository + Sync + 'static,
    H: PasswordHasher + 'static,
{
    let req = accept(payload)?;

    let input = RegisterInput {
        email: req.email,
        full_name: req.full_name,
        gender: req.gender.parse()?,
        date_of_birth: req.date_of_birth,
        registration_method: req.registration_method.parse()?,
        password: req.password,
    };

    let output = state.session.register(input).await?;
    let now = state.session.clock().now();

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::new(&output.account, &output.tokens, now)),
    ))
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/v1/auth/login
pub async fn login<A, T, H>(
    State(state): State<AuthAppState<A, T, H>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AuthResult<Json<AuthResponse>>
where
    A: AccountRepository + Sync + 'static,
    T: TokenRepository + Sync + 'static,
    H: PasswordHasher + 'static,
{
    let req = accept(payload)?;

    let output = state
        .session
        .login(LoginInput {
            email: req.email,
            password: req.password,
        })
        .await?;
    let now = state.session.clock().now();

    Ok(Json(AuthResponse::new(&output.account, &output.tokens, now)))
}

// ============================================================================
// Refresh
// ============================================================================

/// POST /api/v1/auth/refresh
pub async fn refresh<A, T, H>(
    State(state): State<AuthAppState<A, T, H>>,
    payload: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> AuthResult<Json<RefreshResponse>>
where
    A: AccountRepository + Sync + 'static,
    T: TokenRepository + Sync + 'static,
    H: PasswordHasher + 'static,
{
    let req = accept(payload)?;

    let tokens = state.session.refresh_token(&req.refresh_token).await?;
    let now = state.session.clock().now();

    Ok(Json(RefreshResponse::new(&tokens, now)))
}

// ============================================================================
// Profile
// ============================================================================

/// GET /api/v1/auth/me
pub async fn me<A, T, H>(
    State(state): State<AuthAppState<A, T, H>>,
    headers: HeaderMap,
) -> AuthResult<Json<UserResponse>>
where
    A: AccountRepository + Sync + 'static,
    T: TokenRepository + Sync + 'static,
    H: PasswordHasher + 'static,
{
    let token = bearer_token(&headers)?;
    let account = state.session.get_profile(token).await?;

    Ok(Json(UserResponse::from(&account)))
}

// ============================================================================
// Logout
// ============================================================================

/// POST /api/v1/auth/logout
pub async fn logout<A, T, H>(
    State(state): State<AuthAppState<A, T, H>>,
    payload: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> AuthResult<StatusCode>
where
    A: AccountRepository + Sync + 'static,
    T: TokenRepository + Sync + 'static,
    H: PasswordHasher + 'static,
{
    let req = accept(payload)?;
    state.session.logout(&req.refresh_token).await?;

    Ok(StatusCode::NO_CONTENT)
}
