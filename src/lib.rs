//! Portal settings
//!
//! Reconciles the login ID settings screen of the admin portal with the app
//! config document: derive an editable snapshot, then write back only the
//! fields the user changed.

pub mod config;
pub mod document;
pub mod logging;
pub mod loginid;
pub mod session;

pub use document::{ConfigDocument, DocumentError, DocumentFormat};
pub use loginid::{
    compute_and_apply_patch, derive_snapshot, FieldError, FieldKey, FieldValue, LoginIdKeyType,
    LoginIdSettings,
};
pub use session::{ConfigSink, EditSession, FileSink, SaveOutcome, SessionError, SinkError};
