//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Injectable clocks (system and manual)
//! - Cryptographic utilities (CSPRNG bytes, hex token values)
//! - Password policy and hashing (Argon2id behind a `PasswordHasher` capability)
//! - Sliding-window rate limiting with idle eviction
//! - Cancellable periodic background tasks
//! - Client identification for rate-limit source keys

pub mod client;
pub mod clock;
pub mod crypto;
pub mod password;
pub mod rate_limit;
pub mod task;
