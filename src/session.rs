//! Edit session for the login ID settings screen
//!
//! Holds the two snapshots of one editing session:
//! - `initial`: captured once when editing begins, never mutated
//! - `current`: starts as a copy of `initial` and follows user edits
//!
//! Saving computes the patch and hands the new document to a [`ConfigSink`].
//! The session performs no I/O of its own.
//!
//! There is no concurrency token: two sessions editing the same document are
//! last-write-wins at the sink. The base digest is recorded for reporting
//! only.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::document::{ConfigDocument, DocumentError};
use crate::loginid::{
    compute_and_apply_patch, derive_snapshot, FieldError, FieldKey, FieldValue, LoginIdSettings,
};

/// Destination for a saved document
pub trait ConfigSink {
    fn save(&mut self, document: &ConfigDocument) -> Result<(), SinkError>;
}

/// Errors reported by a sink
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Save rejected: {0}")]
    Rejected(String),
}

/// Session errors
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("Failed to save config: {0}")]
    Save(#[from] SinkError),

    #[error("Failed to hash config: {0}")]
    Digest(#[from] DocumentError),
}

/// Writes the document to a file, in the format implied by its extension
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSink for FileSink {
    fn save(&mut self, document: &ConfigDocument) -> Result<(), SinkError> {
        document.write_to_file(&self.path)?;
        tracing::info!(path = %self.path.display(), "wrote config document");
        Ok(())
    }
}

/// Result of a successful save
#[derive(Debug, Clone, Serialize)]
pub struct SaveOutcome {
    /// The document handed to the sink
    pub document: ConfigDocument,

    /// Fields written by the patch
    pub changed_fields: Vec<FieldKey>,

    /// Digest of the raw document when the session began
    pub base_digest: String,

    /// Digest of the saved document
    pub digest: String,
}

/// One editing session over a raw config document
#[derive(Debug, Clone)]
pub struct EditSession {
    started_at: DateTime<Utc>,
    base_digest: String,
    raw: ConfigDocument,
    initial: LoginIdSettings,
    current: LoginIdSettings,
}

impl EditSession {
    /// Begin editing a document that already has defaults filled in
    pub fn begin(raw: ConfigDocument) -> Result<Self, SessionError> {
        let initial = derive_snapshot(&raw);
        Self::from_parts(raw, initial)
    }

    /// Begin editing with snapshots read from `effective` and patches
    /// applied to `raw`
    pub fn begin_with_effective(
        effective: &ConfigDocument,
        raw: ConfigDocument,
    ) -> Result<Self, SessionError> {
        let initial = derive_snapshot(effective);
        Self::from_parts(raw, initial)
    }

    fn from_parts(raw: ConfigDocument, initial: LoginIdSettings) -> Result<Self, SessionError> {
        let base_digest = raw.digest()?;
        tracing::debug!(base_digest = %base_digest, "edit session started");
        Ok(Self {
            started_at: Utc::now(),
            base_digest,
            raw,
            current: initial.clone(),
            initial,
        })
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn base_digest(&self) -> &str {
        &self.base_digest
    }

    pub fn raw(&self) -> &ConfigDocument {
        &self.raw
    }

    pub fn initial(&self) -> &LoginIdSettings {
        &self.initial
    }

    pub fn current(&self) -> &LoginIdSettings {
        &self.current
    }

    /// Edit one field of the current snapshot
    pub fn set(&mut self, key: FieldKey, value: FieldValue) -> Result<(), SessionError> {
        self.current.set(key, value)?;
        Ok(())
    }

    /// Replace the whole current snapshot
    pub fn replace_current(&mut self, current: LoginIdSettings) {
        self.current = current;
    }

    /// Discard edits, making current equal to initial again
    pub fn reset(&mut self) {
        self.current = self.initial.clone();
    }

    pub fn is_dirty(&self) -> bool {
        self.current != self.initial
    }

    pub fn changed_fields(&self) -> Vec<FieldKey> {
        self.current.changed_fields(&self.initial)
    }

    /// The document a save would produce
    pub fn preview(&self) -> ConfigDocument {
        compute_and_apply_patch(&self.raw, &self.initial, &self.current)
    }

    /// Patch the raw document and hand it to `sink`.
    ///
    /// On failure the session is unchanged and the save may be retried.
    pub fn save(&self, sink: &mut dyn ConfigSink) -> Result<SaveOutcome, SessionError> {
        let document = self.preview();
        let changed_fields = self.changed_fields();
        let digest = document.digest()?;

        tracing::warn!(
            base_digest = %self.base_digest,
            "saving without a concurrency check; concurrent edits are last-write-wins"
        );

        if let Err(e) = sink.save(&document) {
            tracing::error!(error = %e, "config save failed; edits kept for retry");
            return Err(e.into());
        }

        tracing::info!(
            changed = changed_fields.len(),
            digest = %digest,
            "saved login ID settings"
        );

        Ok(SaveOutcome {
            document,
            changed_fields,
            base_digest: self.base_digest.clone(),
            digest,
        })
    }

    /// Abandon the session, returning the raw document untouched
    pub fn cancel(self) -> ConfigDocument {
        tracing::debug!(dirty = self.is_dirty(), "edit session cancelled");
        self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Default)]
    struct MemorySink {
        saved: Vec<ConfigDocument>,
        fail_next: bool,
    }

    impl ConfigSink for MemorySink {
        fn save(&mut self, document: &ConfigDocument) -> Result<(), SinkError> {
            if self.fail_next {
                self.fail_next = false;
                return Err(SinkError::Rejected("network unreachable".to_string()));
            }
            self.saved.push(document.clone());
            Ok(())
        }
    }

    fn sample_doc() -> ConfigDocument {
        ConfigDocument::new(json!({
            "id": "my-app",
            "identity": {"login_id": {"keys": [{"type": "email"}]}}
        }))
    }

    #[test]
    fn test_begin_copies_initial_into_current() {
        let session = EditSession::begin(sample_doc()).unwrap();

        assert_eq!(session.initial(), session.current());
        assert!(session.initial().email_enabled);
        assert!(!session.is_dirty());
        assert_eq!(session.base_digest(), sample_doc().digest().unwrap());
    }

    #[test]
    fn test_set_tracks_changes_without_touching_initial() {
        let mut session = EditSession::begin(sample_doc()).unwrap();

        session.set(FieldKey::AllowPlus, FieldValue::Bool(false)).unwrap();

        assert!(session.is_dirty());
        assert_eq!(session.changed_fields(), vec![FieldKey::AllowPlus]);
        assert!(session.initial().is_allow_plus);
    }

    #[test]
    fn test_set_wrong_kind_is_error() {
        let mut session = EditSession::begin(sample_doc()).unwrap();
        let err = session
            .set(FieldKey::AsciiOnly, FieldValue::List(vec!["x".into()]))
            .unwrap_err();
        assert!(matches!(err, SessionError::Field(FieldError::TypeMismatch { .. })));
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_reset_discards_edits() {
        let mut session = EditSession::begin(sample_doc()).unwrap();
        session.set(FieldKey::AsciiOnly, FieldValue::Bool(true)).unwrap();

        session.reset();

        assert!(!session.is_dirty());
        assert_eq!(session.preview(), sample_doc());
    }

    #[test]
    fn test_save_hands_patched_document_to_sink() {
        let mut session = EditSession::begin(sample_doc()).unwrap();
        session.set(FieldKey::AllowPlus, FieldValue::Bool(false)).unwrap();
        let mut sink = MemorySink::default();

        let outcome = session.save(&mut sink).unwrap();

        assert_eq!(sink.saved.len(), 1);
        assert_eq!(sink.saved[0], outcome.document);
        assert_eq!(outcome.changed_fields, vec![FieldKey::AllowPlus]);
        assert_eq!(
            outcome.document.get("identity.login_id.types.email.block_plus_sign"),
            Some(&json!(true))
        );
        assert_ne!(outcome.digest, outcome.base_digest);
    }

    #[test]
    fn test_failed_save_keeps_current_for_retry() {
        let mut session = EditSession::begin(sample_doc()).unwrap();
        session.set(FieldKey::EmailCaseSensitive, FieldValue::Bool(true)).unwrap();
        let mut sink = MemorySink {
            fail_next: true,
            ..MemorySink::default()
        };

        let err = session.save(&mut sink).unwrap_err();
        assert!(matches!(err, SessionError::Save(SinkError::Rejected(_))));
        assert!(sink.saved.is_empty());
        assert!(session.current().is_email_case_sensitive);

        let outcome = session.save(&mut sink).unwrap();
        assert_eq!(sink.saved.len(), 1);
        assert_eq!(outcome.changed_fields, vec![FieldKey::EmailCaseSensitive]);
    }

    #[test]
    fn test_effective_document_drives_snapshot() {
        // The effective config lists username by default; the raw file does not
        let effective = ConfigDocument::new(json!({
            "identity": {"login_id": {"keys": [{"type": "username"}]}}
        }));
        let raw = ConfigDocument::new(json!({"id": "my-app"}));

        let mut session = EditSession::begin_with_effective(&effective, raw.clone()).unwrap();
        assert!(session.initial().username_enabled);

        session.set(FieldKey::AsciiOnly, FieldValue::Bool(true)).unwrap();
        let preview = session.preview();

        assert_eq!(preview.get("id"), Some(&json!("my-app")));
        assert!(preview.get("identity.login_id.keys").is_none());
        assert_eq!(
            preview.get("identity.login_id.types.username.ascii_only"),
            Some(&json!(true))
        );
    }

    #[test]
    fn test_cancel_returns_raw_document() {
        let mut session = EditSession::begin(sample_doc()).unwrap();
        session.set(FieldKey::AsciiOnly, FieldValue::Bool(true)).unwrap();
        assert_eq!(session.cancel(), sample_doc());
    }

    #[test]
    fn test_file_sink_writes_yaml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("authgear.yaml");
        let mut session = EditSession::begin(sample_doc()).unwrap();
        session.set(FieldKey::IgnoreDotLocal, FieldValue::Bool(true)).unwrap();

        let mut sink = FileSink::new(&path);
        session.save(&mut sink).unwrap();

        let written = ConfigDocument::from_file(&path).unwrap();
        assert_eq!(
            written.get("identity.login_id.types.email.ignore_dot_sign"),
            Some(&json!(true))
        );
    }
}
