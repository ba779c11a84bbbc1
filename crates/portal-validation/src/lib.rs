//! Portal form validation
//!
//! Business-rule checks that run before a mutation is sent. Errors are
//! collected, not short-circuited, so a form can show all of them at once.

pub mod error;
pub mod role;

pub use error::{ValidationError, ValidationErrorKind};
pub use role::{validate_role, RoleInput, ValidatedRole, ROLE_KEY_MAX_LENGTH, ROLE_NAME_MAX_LENGTH};
