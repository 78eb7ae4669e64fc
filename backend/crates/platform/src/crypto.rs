//! Cryptographic Utilities

use rand::{RngCore, rngs::OsRng};
use thiserror::Error;

/// Bytes of entropy in an opaque credential value (256 bits).
pub const TOKEN_BYTES: usize = 32;

#[derive(Debug, Error)]
pub enum CryptoError {
    /// The OS random source failed. Nothing sensible can continue.
    #[error("secure random source unavailable: {0}")]
    RandomSourceUnavailable(#[from] rand::Error),
}

/// Fill `len` bytes from the OS CSPRNG.
pub fn try_random_bytes(len: usize) -> Result<Vec<u8>, CryptoError> {
    let mut bytes = vec![0u8; len];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(bytes)
}

/// 256-bit random value rendered as 64 lowercase hex characters.
pub fn random_token_hex() -> Result<String, CryptoError> {
    try_random_bytes(TOKEN_BYTES).map(hex::encode)
}
