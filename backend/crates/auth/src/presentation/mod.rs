//! Presentation Layer
//!
//! HTTP handlers, DTOs, validation tables, rate gates and router.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod validation;

pub use handlers::AuthAppState;
pub use router::{AUTH_PREFIX, auth_router};
