//! Role form validation

use regex_lite::Regex;
use std::sync::OnceLock;

use crate::error::{ValidationError, ValidationErrorKind};

pub const ROLE_KEY_MAX_LENGTH: usize = 40;
pub const ROLE_NAME_MAX_LENGTH: usize = 100;

/// Keys under this prefix belong to the platform
const RESERVED_KEY_PREFIX: &str = "authgear:";

fn role_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-zA-Z_][a-zA-Z0-9:_]*$").expect("role key pattern is valid")
    })
}

/// Raw form input
#[derive(Debug, Clone, Default)]
pub struct RoleInput {
    pub key: String,
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Trimmed, checked role fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRole {
    pub key: String,
    pub name: Option<String>,
    pub description: Option<String>,
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Validate a role form, collecting every error
pub fn validate_role(input: &RoleInput) -> Result<ValidatedRole, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let key = input.key.trim().to_string();
    if key.is_empty() {
        errors.push(ValidationError::new("key", ValidationErrorKind::Required));
    } else {
        if key.chars().count() > ROLE_KEY_MAX_LENGTH {
            errors.push(ValidationError::new(
                "key",
                ValidationErrorKind::TooLong {
                    max: ROLE_KEY_MAX_LENGTH,
                },
            ));
        }
        if !role_key_pattern().is_match(&key) {
            errors.push(ValidationError::new("key", ValidationErrorKind::InvalidFormat));
        }
        if key.starts_with(RESERVED_KEY_PREFIX) {
            errors.push(ValidationError::new(
                "key",
                ValidationErrorKind::ReservedPrefix {
                    prefix: RESERVED_KEY_PREFIX.to_string(),
                },
            ));
        }
    }

    let name = trimmed(input.name.as_deref());
    if let Some(name) = &name {
        if name.chars().count() > ROLE_NAME_MAX_LENGTH {
            errors.push(ValidationError::new(
                "name",
                ValidationErrorKind::TooLong {
                    max: ROLE_NAME_MAX_LENGTH,
                },
            ));
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ValidatedRole {
        key,
        name,
        description: trimmed(input.description.as_deref()),
    })
}
