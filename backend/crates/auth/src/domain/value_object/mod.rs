//! Value Object Module

pub mod date_of_birth;
pub mod email;
pub mod full_name;
pub mod gender;
pub mod registration_method;
pub mod token_value;

pub use date_of_birth::DateOfBirth;
pub use email::Email;
pub use full_name::FullName;
pub use gender::Gender;
pub use registration_method::RegistrationMethod;
pub use token_value::TokenValue;
