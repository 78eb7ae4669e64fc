//! Application Layer
//!
//! `SessionManager` and its operations, one file per operation.

pub mod config;
pub mod login;
pub mod logout;
pub mod profile;
pub mod refresh;
pub mod register;
pub mod session_manager;

// Re-exports
pub use config::AuthConfig;
pub use login::LoginInput;
pub use register::RegisterInput;
pub use session_manager::{SessionManager, SessionOutput};
