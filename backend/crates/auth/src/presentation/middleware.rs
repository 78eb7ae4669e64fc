//! Rate Limit Middleware
//!
//! Every route passes the source gate. Routes that carry a credential
//! also pass the identity gate, keyed on the account the credential
//! belongs to.

use std::net::SocketAddr;

use axum::body::{Body, to_bytes};
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, Request, header};
use axum::middleware::Next;
use axum::response::Response;
use kernel::id::AccountId;
use platform::client::{extract_client_ip, source_key};
use platform::password::PasswordHasher;

use crate::domain::repository::{AccountRepository, TokenRepository};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::RefreshTokenRequest;
use crate::presentation::handlers::AuthAppState;

/// Largest body the identity gate will buffer
pub const MAX_GATED_BODY_BYTES: usize = 64 * 1024;

/// Identity key for an account
pub fn identity_key(account: &AccountId) -> String {
    format!("account:{account}")
}

/// Source key of the request: forwarding headers first, then the peer address.
fn request_source_key(req: &Request<Body>) -> String {
    let direct = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());

    source_key(extract_client_ip(req.headers(), direct))
}

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> AuthResult<&str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthFormat)?;

    match value.split_once(' ') {
        Some(("Bearer", token)) if !token.is_empty() && !token.contains(' ') => Ok(token),
        _ => Err(AuthError::InvalidAuthFormat),
    }
}

/// Source gate only
pub async fn source_gate<A, T, H>(
    State(state): State<AuthAppState<A, T, H>>,
    req: Request<Body>,
    next: Next,
) -> AuthResult<Response>
where
    A: AccountRepository + Sync + 'static,
    T: TokenRepository + Sync + 'static,
    H: PasswordHasher + 'static,
{
    let source = request_source_key(&req);
    state.limiter.check(&source, None).await?;

    Ok(next.run(req).await)
}

/// Source gate plus identity gate on the bearer access token.
///
/// A missing or unusable header is not rejected here; the handler owns
/// that error.
pub async fn bearer_gate<A, T, H>(
    State(state): State<AuthAppState<A, T, H>>,
    req: Request<Body>,
    next: Next,
) -> AuthResult<Response>
where
    A: AccountRepository + Sync + 'static,
    T: TokenRepository + Sync + 'static,
    H: PasswordHasher + 'static,
{
    let source = request_source_key(&req);

    let token = bearer_token(req.headers()).ok().map(str::to_owned);
    let identity = match token {
        Some(token) => state.session.identify(&token).await.map(|id| identity_key(&id)),
        None => None,
    };

    state.limiter.check(&source, identity.as_deref()).await?;

    Ok(next.run(req).await)
}

/// Source gate plus identity gate on the `refreshToken` body field.
///
/// The body is buffered, inspected and handed on unchanged. A body that
/// is not a token request is rejected before any limiter is touched.
pub async fn body_token_gate<A, T, H>(
    State(state): State<AuthAppState<A, T, H>>,
    req: Request<Body>,
    next: Next,
) -> AuthResult<Response>
where
    A: AccountRepository + Sync + 'static,
    T: TokenRepository + Sync + 'static,
    H: PasswordHasher + 'static,
{
    let source = request_source_key(&req);

    let (parts, body) = req.into_parts();
    let bytes = to_bytes(body, MAX_GATED_BODY_BYTES)
        .await
        .map_err(|_| AuthError::InvalidRequest("Invalid request body".to_string()))?;

    let request: RefreshTokenRequest = serde_json::from_slice(&bytes)
        .map_err(|_| AuthError::InvalidRequest("Invalid request body".to_string()))?;

    let identity = match request.refresh_token.as_str() {
        "" => None,
        token => state.session.identify(token).await.map(|id| identity_key(&id)),
    };

    state.limiter.check(&source, identity.as_deref()).await?;

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}
