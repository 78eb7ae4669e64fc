//! Auth Router

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use platform::password::PasswordHasher;
use platform::rate_limit::RateLimiter;

use crate::application::SessionManager;
use crate::domain::repository::{AccountRepository, TokenRepository};
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{body_token_gate, bearer_gate, source_gate};

/// Mount point of [`auth_router`]
pub const AUTH_PREFIX: &str = "/api/v1/auth";

/// Auth routes, nested under [`AUTH_PREFIX`], each behind its rate gate
pub fn auth_router<A, T, H>(session: SessionManager<A, T, H>, limiter: Arc<RateLimiter>) -> Router
where
    A: AccountRepository + Sync + 'static,
    T: TokenRepository + Sync + 'static,
    H: PasswordHasher + 'static,
{
    let state = AuthAppState { session, limiter };

    let source_gated = Router::new()
        .route("/register", post(handlers::register::<A, T, H>))
        .route("/login", post(handlers::login::<A, T, H>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            source_gate::<A, T, H>,
        ));

    let bearer_gated = Router::new()
        .route("/me", get(handlers::me::<A, T, H>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            bearer_gate::<A, T, H>,
        ));

    let body_gated = Router::new()
        .route("/refresh", post(handlers::refresh::<A, T, H>))
        .route("/logout", post(handlers::logout::<A, T, H>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            body_token_gate::<A, T, H>,
        ));

    let routes = source_gated
        .merge(bearer_gated)
        .merge(body_gated)
        .with_state(state);

    Router::new().nest(AUTH_PREFIX, routes)
}
