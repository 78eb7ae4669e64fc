//! Request Validation
//!
//! Every request shape declares a static table of field rules. The table
//! is evaluated by [`validate`]; nothing is discovered at runtime.

use crate::domain::value_object::Email;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{LoginRequest, RefreshTokenRequest, RegisterRequest};

/// A single field rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    Email,
    /// Minimum length in characters
    MinLen(usize),
    /// Maximum length in characters
    MaxLen(usize),
    OneOf(&'static [&'static str]),
    /// Required when another field holds the given value
    RequiredIf {
        field: &'static str,
        equals: &'static str,
    },
}

/// Rules for one field, named as on the wire
#[derive(Debug, Clone, Copy)]
pub struct FieldRules {
    pub field: &'static str,
    pub rules: &'static [Rule],
}

/// A request shape with a validation table
pub trait Validate {
    const RULES: &'static [FieldRules];

    /// Raw value of a wire field. Absent and empty are the same thing.
    fn field(&self, name: &str) -> Option<&str>;
}

/// Check a request against its table.
///
/// Reports the first failing rule of every field. Rules other than
/// `Required` and `RequiredIf` only apply to non-empty values.
pub fn validate<R: Validate>(request: &R) -> AuthResult<()> {
    let mut problems = Vec::new();

    for FieldRules { field, rules } in R::RULES {
        let value = request.field(field).filter(|v| !v.is_empty());
        if let Some(problem) = rules.iter().find_map(|rule| check(request, field, value, rule)) {
            problems.push(problem);
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(AuthError::Validation(problems.join("; ")))
    }
}

fn check<R: Validate>(request: &R, field: &str, value: Option<&str>, rule: &Rule) -> Option<String> {
    match (rule, value) {
        (Rule::Required, None) => Some(format!("{field} is required")),
        (Rule::RequiredIf { field: other, equals }, None)
            if request.field(other) == Some(*equals) =>
        {
            Some(format!("{field} is required when {other} is {equals}"))
        }
        (Rule::Email, Some(v)) if Email::new(v).is_err() => {
            Some(format!("{field} must be a valid email address"))
        }
        (Rule::MinLen(min), Some(v)) if v.chars().count() < *min => {
            Some(format!("{field} must be at least {min} characters"))
        }
        (Rule::MaxLen(max), Some(v)) if v.chars().count() > *max => {
            Some(format!("{field} must be at most {max} characters"))
        }
        (Rule::OneOf(allowed), Some(v)) if !allowed.iter().any(|a| *a == v) => {
            Some(format!("{field} must be one of: {}", allowed.join(", ")))
        }
        _ => None,
    }
}

// ============================================================================
// Tables
// ============================================================================

const GENDERS: &[&str] = &["male", "female", "other", "prefer_not_to_say"];
const REGISTRATION_METHODS: &[&str] = &["email", "google", "apple"];

impl Validate for RegisterRequest {
    const RULES: &'static [FieldRules] = &[
        FieldRules { field: "email", rules: &[Rule::Required, Rule::Email] },
        FieldRules {
            field: "fullName",
            rules: &[Rule::Required, Rule::MinLen(2), Rule::MaxLen(100)],
        },
        FieldRules { field: "gender", rules: &[Rule::Required, Rule::OneOf(GENDERS)] },
        FieldRules { field: "dateOfBirth", rules: &[Rule::Required] },
        FieldRules {
            field: "registrationMethod",
            rules: &[Rule::Required, Rule::OneOf(REGISTRATION_METHODS)],
        },
        FieldRules {
            field: "password",
            rules: &[
                Rule::RequiredIf { field: "registrationMethod", equals: "email" },
                Rule::MinLen(8),
            ],
        },
    ];

    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "email" => Some(&self.email),
            "fullName" => Some(&self.full_name),
            "gender" => Some(&self.gender),
            "dateOfBirth" => Some(&self.date_of_birth),
            "registrationMethod" => Some(&self.registration_method),
            "password" => self.password.as_deref(),
            _ => None,
        }
    }
}

impl Validate for LoginRequest {
    const RULES: &'static [FieldRules] = &[
        FieldRules { field: "email", rules: &[Rule::Required, Rule::Email] },
        FieldRules { field: "password", rules: &[Rule::Required] },
    ];

    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "email" => Some(&self.email),
            "password" => Some(&self.password),
            _ => None,
        }
    }
}

impl Validate for RefreshTokenRequest {
    const RULES: &'static [FieldRules] =
        &[FieldRules { field: "refreshToken", rules: &[Rule::Required] }];

    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "refreshToken" => Some(&self.refresh_token),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(method: &str, password: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            email: "ada@example.com".to_string(),
            full_name: "Ada Lovelace".to_string(),
            gender: "female".to_string(),
            date_of_birth: "1990-12-10".to_string(),
            registration_method: method.to_string(),
            password: password.map(str::to_string),
        }
    }

    fn message(result: AuthResult<()>) -> String {
        match result {
            Err(AuthError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_register() {
        assert!(validate(&register("email", Some("Aa1!aaaa"))).is_ok());
        assert!(validate(&register("google", None)).is_ok());
    }

    #[test]
    fn test_password_required_only_for_email() {
        let msg = message(validate(&register("email", None)));
        assert_eq!(msg, "password is required when registrationMethod is email");

        // Empty counts as absent
        assert!(validate(&register("apple", Some(""))).is_ok());
    }

    #[test]
    fn test_password_min_len_when_present() {
        let msg = message(validate(&register("email", Some("Aa1!"))));
        assert_eq!(msg, "password must be at least 8 characters");
    }

    #[test]
    fn test_reports_every_field() {
        let mut req = register("fax", Some("Aa1!aaaa"));
        req.email = "not-an-email".to_string();
        req.full_name = "A".to_string();
        req.gender = String::new();

        let msg = message(validate(&req));
        assert!(msg.contains("email must be a valid email address"));
        assert!(msg.contains("fullName must be at least 2 characters"));
        assert!(msg.contains("gender is required"));
        assert!(msg.contains("registrationMethod must be one of: email, google, apple"));
    }

    #[test]
    fn test_full_name_max_len() {
        let mut req = register("google", None);
        req.full_name = "a".repeat(101);
        assert_eq!(
            message(validate(&req)),
            "fullName must be at most 100 characters"
        );
    }

    #[test]
    fn test_login_and_refresh() {
        let login = LoginRequest {
            email: String::new(),
            password: "x".to_string(),
        };
        assert_eq!(message(validate(&login)), "email is required");

        let refresh = RefreshTokenRequest {
            refresh_token: String::new(),
        };
        assert_eq!(message(validate(&refresh)), "refreshToken is required");
    }
}
