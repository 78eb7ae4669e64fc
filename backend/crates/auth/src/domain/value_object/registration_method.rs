use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AuthError;

/// How the account was created. Only `Email` accounts carry a password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationMethod {
    Email,
    Google,
    Apple,
}

impl RegistrationMethod {
    pub const ALL: [RegistrationMethod; 3] = [
        RegistrationMethod::Email,
        RegistrationMethod::Google,
        RegistrationMethod::Apple,
    ];

    #[inline]
    pub const fn code(&self) -> &'static str {
        use RegistrationMethod::*;
        match self {
            Email => "email",
            Google => "google",
            Apple => "apple",
        }
    }

    #[inline]
    pub const fn is_oauth(&self) -> bool {
        !matches!(self, RegistrationMethod::Email)
    }
}

impl FromStr for RegistrationMethod {
    type Err = AuthError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        RegistrationMethod::ALL
            .into_iter()
            .find(|m| m.code() == code)
            .ok_or_else(|| {
                AuthError::InvalidRegistrationMethod(format!("Invalid registration method: {code}"))
            })
    }
}

impl fmt::Display for RegistrationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
