//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use auth::{AuthConfig, InMemoryAccountStore, InMemoryTokenStore, SessionManager, auth_router};
use axum::{
    Router,
    extract::Request,
    http,
    http::{Method, header},
};
use kernel::error::app_error::AppError;
use platform::clock::{Clock, SystemClock};
use platform::password::Argon2Hasher;
use platform::rate_limit::{RateLimitConfig, RateLimiter};
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,platform=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr: SocketAddr = env_or("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 9090)))?;
    let rate_limit = RateLimitConfig::new(
        env_or("RATE_LIMIT_MAX_REQUESTS", 100)?,
        env_or("RATE_LIMIT_WINDOW_SECS", 60)?,
    );
    let sweep_interval = Duration::from_secs(env_or("TOKEN_SWEEP_INTERVAL_SECS", 300)?);

    let auth_config = match env::var("PASSWORD_PEPPER") {
        Ok(pepper) => AuthConfig::with_pepper(pepper),
        Err(_) => {
            tracing::warn!("PASSWORD_PEPPER not set, hashing without a pepper");
            AuthConfig::default()
        }
    };

    let hasher = match auth_config.pepper() {
        Some(pepper) => Argon2Hasher::new().with_pepper(pepper),
        None => Argon2Hasher::new(),
    };

    // Stores and background tasks
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let accounts = Arc::new(InMemoryAccountStore::new());
    let tokens = Arc::new(InMemoryTokenStore::new(clock.clone()));
    let token_sweep = tokens.spawn_expiry_sweep(sweep_interval);

    tracing::info!(
        max_requests = rate_limit.max_requests,
        window_secs = rate_limit.window.as_secs(),
        "Rate limiter configured"
    );
    let limiter = Arc::new(RateLimiter::new(rate_limit, clock.clone()).with_eviction());

    let session = SessionManager::new(accounts, tokens, Arc::new(hasher), clock, auth_config);

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]));

    // Build router
    let app = with_middleware(auth_router(session, limiter.clone()), cors);

    // Start server
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Shutting down background tasks");
    limiter.shutdown().await;
    token_sweep.stop().await;

    Ok(())
}

/// Fallback, request ID, tracing and CORS around the application routes.
///
/// An incoming `X-Request-ID` is kept, otherwise a UUID is assigned. Either
/// way it is recorded on the request span and echoed on the response.
fn with_middleware(routes: Router, cors: CorsLayer) -> Router {
    routes
        .fallback(|| async { AppError::not_found("Route not found") })
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(|req: &Request| {
            let request_id = req
                .headers()
                .get("x-request-id")
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default();
            tracing::info_span!(
                "http_request",
                method = %req.method(),
                uri = %req.uri(),
                request_id,
            )
        }))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors)
}

/// Parse an environment variable, falling back to `default` when unset.
fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        Err(_) => Ok(default),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
