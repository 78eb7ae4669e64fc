pub mod account;
pub mod token;

pub use account::{Account, NewAccount};
pub use token::{Token, TokenKind, TokenPair};
