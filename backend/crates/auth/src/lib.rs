//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - `SessionManager` and its operations
//! - `infra/` - In-memory account and token stores
//! - `presentation/` - HTTP handlers, DTOs, validation, rate gates, router
//!
//! ## Features
//! - Registration by email + password or by OAuth provider (google, apple)
//! - Opaque bearer tokens: 15 minute access, 7 day single-use refresh
//! - Login revokes every earlier refresh token; logout revokes everything
//! - Per-source and per-account sliding-window rate limiting
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, optionally peppered
//! - Token values are 256 bits from the OS random source
//! - Expired and unknown tokens are indistinguishable to clients

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::{AuthConfig, SessionManager};
pub use error::{AuthError, AuthResult};
pub use infra::{InMemoryAccountStore, InMemoryTokenStore};
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}
