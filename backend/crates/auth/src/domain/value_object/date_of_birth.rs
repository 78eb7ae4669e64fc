//! Date of Birth Value Object
//!
//! Exchanged as an ISO calendar date (`YYYY-MM-DD`).
//!
//! Age is computed as `today.year - dob.year`, minus one when today's
//! day-of-year is before the birth day-of-year. Around Feb 29 in leap
//! years this can be off by one day; the rule is kept as is so existing
//! clients see the same accept/reject boundary.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AuthError, AuthResult};

pub const MIN_AGE: i32 = 13;
pub const MAX_AGE: i32 = 120;

const ISO_DATE: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DateOfBirth(NaiveDate);

impl DateOfBirth {
    /// Parse and check the age bounds against `today`.
    pub fn parse(raw: &str, today: NaiveDate) -> AuthResult<Self> {
        let raw = raw.trim();
        // chrono accepts single-digit month/day; the wire format does not
        let date = (raw.len() == 10)
            .then(|| NaiveDate::parse_from_str(raw, ISO_DATE).ok())
            .flatten()
            .ok_or_else(|| {
                AuthError::Validation("Date of birth must be in YYYY-MM-DD format".to_string())
            })?;

        Self::new(date, today)
    }

    pub fn new(date: NaiveDate, today: NaiveDate) -> AuthResult<Self> {
        let dob = Self(date);
        let age = dob.age_on(today);

        if age < MIN_AGE {
            return Err(AuthError::Validation(format!(
                "User must be at least {MIN_AGE} years old"
            )));
        }
        if age > MAX_AGE {
            return Err(AuthError::Validation("Invalid date of birth".to_string()));
        }
        if date > today {
            return Err(AuthError::Validation(
                "Date of birth cannot be in the future".to_string(),
            ));
        }

        Ok(dob)
    }

    /// Day-of-year age rule (see module docs).
    pub fn age_on(&self, today: NaiveDate) -> i32 {
        let mut age = today.year() - self.0.year();
        if today.ordinal() < self.0.ordinal() {
            age -= 1;
        }
        age
    }
}

impl fmt::Display for DateOfBirth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(ISO_DATE))
    }
}
