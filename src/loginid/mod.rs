//! Login ID settings reconciler
//!
//! Maps the `identity.login_id` section of an app config document to a flat,
//! editable [`LoginIdSettings`] snapshot, and writes back only the fields that
//! changed between two snapshots:
//!
//! - [`derive_snapshot`]: document → snapshot, never fails
//! - [`compute_and_apply_patch`]: (document, initial, current) → new document
//!
//! Fields that did not change are left exactly as they are in the document, so
//! edits made elsewhere between load and save are not clobbered.

mod keys;
mod lists;
mod patch;
mod snapshot;

pub use keys::LoginIdKeyType;
pub use lists::effective_list;
pub use patch::compute_and_apply_patch;
pub use snapshot::{derive_snapshot, FieldError, FieldKey, FieldValue, LoginIdSettings};
