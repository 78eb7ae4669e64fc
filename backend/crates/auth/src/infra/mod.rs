//! Infrastructure Layer
//!
//! In-process store implementations.

pub mod memory;

pub use memory::{InMemoryAccountStore, InMemoryTokenStore};
