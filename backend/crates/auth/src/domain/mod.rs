//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{Account, NewAccount, Token, TokenKind, TokenPair};
pub use repository::{AccountRepository, TokenRepository};
