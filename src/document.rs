//! App configuration document
//!
//! A `ConfigDocument` is the raw, arbitrarily nested app config tree as the
//! portal loads it. Any field may be absent. The reconciler never mutates a
//! document in place; every patch produces a new value.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// On-disk format of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self, DocumentError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("json") => Ok(DocumentFormat::Json),
            Some("yaml") | Some("yml") => Ok(DocumentFormat::Yaml),
            _ => Err(DocumentError::UnsupportedFormat(
                path.to_string_lossy().to_string(),
            )),
        }
    }
}

/// Errors reading, writing or hashing a document
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unsupported document format: {0} (expected .json, .yaml or .yml)")]
    UnsupportedFormat(String),

    #[error("Canonicalization failed: {0}")]
    Canonicalize(String),
}

/// A nested, partially-optional app configuration tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigDocument(Value);

impl ConfigDocument {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Get a value by dot-separated path
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.0;
        for part in path.split('.') {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    pub fn from_json_str(s: &str) -> Result<Self, DocumentError> {
        Ok(Self(serde_json::from_str(s)?))
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, DocumentError> {
        // An empty YAML file is a document with nothing set
        let value: Option<Value> = serde_yaml::from_str(s)?;
        Ok(Self(value.unwrap_or(Value::Null)))
    }

    /// Load a document, choosing the parser from the file extension
    pub fn from_file(path: &Path) -> Result<Self, DocumentError> {
        let format = DocumentFormat::from_path(path)?;
        let contents = fs::read_to_string(path)?;
        let document = match format {
            DocumentFormat::Json => Self::from_json_str(&contents)?,
            DocumentFormat::Yaml => Self::from_yaml_str(&contents)?,
        };
        tracing::debug!(path = %path.display(), ?format, "loaded config document");
        Ok(document)
    }

    pub fn to_string(&self, format: DocumentFormat, pretty: bool) -> Result<String, DocumentError> {
        match format {
            DocumentFormat::Json if pretty => Ok(serde_json::to_string_pretty(&self.0)?),
            DocumentFormat::Json => Ok(serde_json::to_string(&self.0)?),
            DocumentFormat::Yaml => Ok(serde_yaml::to_string(&self.0)?),
        }
    }

    /// Write to file in the format implied by its extension
    pub fn write_to_file(&self, path: &Path) -> Result<(), DocumentError> {
        let format = DocumentFormat::from_path(path)?;
        let mut contents = self.to_string(format, true)?;
        if !contents.ends_with('\n') {
            contents.push('\n');
        }
        fs::write(path, contents)?;
        Ok(())
    }

    /// SHA-256 hex digest of the RFC 8785 canonical form.
    ///
    /// Object key order does not affect the digest.
    pub fn digest(&self) -> Result<String, DocumentError> {
        let jcs_bytes = serde_json_canonicalizer::to_vec(&self.0)
            .map_err(|e| DocumentError::Canonicalize(e.to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(&jcs_bytes);
        Ok(hex::encode(hasher.finalize()))
    }
}

impl From<Value> for ConfigDocument {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_get_nested_path() {
        let doc = ConfigDocument::new(json!({
            "identity": {"login_id": {"types": {"email": {"case_sensitive": true}}}}
        }));

        assert_eq!(
            doc.get("identity.login_id.types.email.case_sensitive"),
            Some(&json!(true))
        );
        assert!(doc.get("identity.login_id.keys").is_none());
    }

    #[test]
    fn test_get_through_non_object_is_none() {
        let doc = ConfigDocument::new(json!({"identity": "oops"}));
        assert!(doc.get("identity.login_id").is_none());
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            DocumentFormat::from_path(&PathBuf::from("authgear.yaml")).unwrap(),
            DocumentFormat::Yaml
        );
        assert_eq!(
            DocumentFormat::from_path(&PathBuf::from("app.YML")).unwrap(),
            DocumentFormat::Yaml
        );
        assert_eq!(
            DocumentFormat::from_path(&PathBuf::from("app.json")).unwrap(),
            DocumentFormat::Json
        );
        assert!(DocumentFormat::from_path(&PathBuf::from("app.toml")).is_err());
    }

    #[test]
    fn test_digest_ignores_key_order() {
        let a = ConfigDocument::from_json_str(r#"{"a": 1, "b": {"c": [1, 2]}}"#).unwrap();
        let b = ConfigDocument::from_json_str(r#"{"b": {"c": [1, 2]}, "a": 1}"#).unwrap();
        let c = ConfigDocument::from_json_str(r#"{"b": {"c": [2, 1]}, "a": 1}"#).unwrap();

        assert_eq!(a.digest().unwrap(), b.digest().unwrap());
        assert_ne!(a.digest().unwrap(), c.digest().unwrap());
        assert_eq!(a.digest().unwrap().len(), 64);
    }

    #[test]
    fn test_empty_yaml_is_null_document() {
        let doc = ConfigDocument::from_yaml_str("").unwrap();
        assert_eq!(doc.as_value(), &Value::Null);
    }

    #[test]
    fn test_yaml_file_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("authgear.yaml");
        let doc = ConfigDocument::new(json!({
            "id": "my-app",
            "identity": {"login_id": {"keys": [{"type": "email"}]}}
        }));

        doc.write_to_file(&path).unwrap();
        let loaded = ConfigDocument::from_file(&path).unwrap();

        assert_eq!(loaded, doc);
    }
}
