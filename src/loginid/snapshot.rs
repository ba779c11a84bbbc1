//! Flat, editable view of the login ID settings

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::keys::{is_listed, LoginIdKeyType};
use super::lists::read_string_list;
use crate::document::ConfigDocument;

/// Snapshot of the login ID settings screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginIdSettings {
    pub username_enabled: bool,
    pub email_enabled: bool,
    pub phone_number_enabled: bool,

    pub excluded_keywords: Vec<String>,
    pub is_block_reserved_username: bool,
    pub is_exclude_keywords: bool,
    pub is_username_case_sensitive: bool,
    pub is_ascii_only: bool,

    pub is_email_case_sensitive: bool,
    pub is_ignore_dot_local: bool,
    pub is_allow_plus: bool,
}

impl Default for LoginIdSettings {
    /// Settings derived from a document with nothing set
    fn default() -> Self {
        Self {
            username_enabled: false,
            email_enabled: false,
            phone_number_enabled: false,
            excluded_keywords: Vec::new(),
            is_block_reserved_username: false,
            is_exclude_keywords: false,
            is_username_case_sensitive: false,
            is_ascii_only: false,
            is_email_case_sensitive: false,
            is_ignore_dot_local: false,
            is_allow_plus: true,
        }
    }
}

/// Addressable field of [`LoginIdSettings`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldKey {
    UsernameEnabled,
    EmailEnabled,
    PhoneNumberEnabled,
    ExcludedKeywords,
    BlockReservedUsername,
    ExcludeKeywords,
    UsernameCaseSensitive,
    AsciiOnly,
    EmailCaseSensitive,
    IgnoreDotLocal,
    AllowPlus,
}

impl FieldKey {
    /// All fields in declaration order
    pub const ALL: [FieldKey; 11] = [
        FieldKey::UsernameEnabled,
        FieldKey::EmailEnabled,
        FieldKey::PhoneNumberEnabled,
        FieldKey::ExcludedKeywords,
        FieldKey::BlockReservedUsername,
        FieldKey::ExcludeKeywords,
        FieldKey::UsernameCaseSensitive,
        FieldKey::AsciiOnly,
        FieldKey::EmailCaseSensitive,
        FieldKey::IgnoreDotLocal,
        FieldKey::AllowPlus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKey::UsernameEnabled => "username.enabled",
            FieldKey::EmailEnabled => "email.enabled",
            FieldKey::PhoneNumberEnabled => "phone.enabled",
            FieldKey::ExcludedKeywords => "username.excluded_keywords",
            FieldKey::BlockReservedUsername => "username.block_reserved",
            FieldKey::ExcludeKeywords => "username.exclude_keywords",
            FieldKey::UsernameCaseSensitive => "username.case_sensitive",
            FieldKey::AsciiOnly => "username.ascii_only",
            FieldKey::EmailCaseSensitive => "email.case_sensitive",
            FieldKey::IgnoreDotLocal => "email.ignore_dot_local",
            FieldKey::AllowPlus => "email.allow_plus",
        }
    }

    /// Login ID type toggled by this field, for the enablement flags
    pub fn key_type(&self) -> Option<LoginIdKeyType> {
        match self {
            FieldKey::UsernameEnabled => Some(LoginIdKeyType::Username),
            FieldKey::EmailEnabled => Some(LoginIdKeyType::Email),
            FieldKey::PhoneNumberEnabled => Some(LoginIdKeyType::Phone),
            _ => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, FieldKey::ExcludedKeywords)
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FieldKey {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldKey::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| FieldError::UnknownField(s.to_string()))
    }
}

impl TryFrom<String> for FieldKey {
    type Error = FieldError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<FieldKey> for String {
    fn from(key: FieldKey) -> Self {
        key.as_str().to_string()
    }
}

/// Value of a single snapshot field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    List(Vec<String>),
}

impl FieldValue {
    /// Parse a command-line value for `key`.
    ///
    /// Booleans accept `true`/`false`; lists are comma-separated, and an empty
    /// string is the empty list.
    pub fn parse_for(key: FieldKey, raw: &str) -> Result<Self, FieldError> {
        if key.is_list() {
            if raw.is_empty() {
                return Ok(FieldValue::List(Vec::new()));
            }
            return Ok(FieldValue::List(raw.split(',').map(str::to_string).collect()));
        }
        match raw {
            "true" => Ok(FieldValue::Bool(true)),
            "false" => Ok(FieldValue::Bool(false)),
            _ => Err(FieldError::InvalidValue {
                field: key,
                value: raw.to_string(),
            }),
        }
    }
}

/// Errors addressing snapshot fields
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field {field} expects a {expected} value")]
    TypeMismatch { field: FieldKey, expected: &'static str },

    #[error("Invalid value for {field}: {value:?}")]
    InvalidValue { field: FieldKey, value: String },
}

impl LoginIdSettings {
    pub fn get(&self, key: FieldKey) -> FieldValue {
        match self.bool_field(key) {
            Some(b) => FieldValue::Bool(b),
            None => FieldValue::List(self.excluded_keywords.clone()),
        }
    }

    /// Set one field, rejecting a value of the wrong kind
    pub fn set(&mut self, key: FieldKey, value: FieldValue) -> Result<(), FieldError> {
        match value {
            FieldValue::Bool(b) => match self.bool_field_mut(key) {
                Some(slot) => {
                    *slot = b;
                    Ok(())
                }
                None => Err(FieldError::TypeMismatch {
                    field: key,
                    expected: "list",
                }),
            },
            FieldValue::List(list) if key.is_list() => {
                self.excluded_keywords = list;
                Ok(())
            }
            FieldValue::List(_) => Err(FieldError::TypeMismatch {
                field: key,
                expected: "boolean",
            }),
        }
    }

    /// Fields whose values differ from `other`, in declaration order.
    ///
    /// Lists compare in order; reordering counts as a change.
    pub fn changed_fields(&self, other: &LoginIdSettings) -> Vec<FieldKey> {
        FieldKey::ALL
            .iter()
            .copied()
            .filter(|key| self.get(*key) != other.get(*key))
            .collect()
    }

    fn bool_field(&self, key: FieldKey) -> Option<bool> {
        let value = match key {
            FieldKey::UsernameEnabled => self.username_enabled,
            FieldKey::EmailEnabled => self.email_enabled,
            FieldKey::PhoneNumberEnabled => self.phone_number_enabled,
            FieldKey::BlockReservedUsername => self.is_block_reserved_username,
            FieldKey::ExcludeKeywords => self.is_exclude_keywords,
            FieldKey::UsernameCaseSensitive => self.is_username_case_sensitive,
            FieldKey::AsciiOnly => self.is_ascii_only,
            FieldKey::EmailCaseSensitive => self.is_email_case_sensitive,
            FieldKey::IgnoreDotLocal => self.is_ignore_dot_local,
            FieldKey::AllowPlus => self.is_allow_plus,
            FieldKey::ExcludedKeywords => return None,
        };
        Some(value)
    }

    fn bool_field_mut(&mut self, key: FieldKey) -> Option<&mut bool> {
        match key {
            FieldKey::UsernameEnabled => Some(&mut self.username_enabled),
            FieldKey::EmailEnabled => Some(&mut self.email_enabled),
            FieldKey::PhoneNumberEnabled => Some(&mut self.phone_number_enabled),
            FieldKey::BlockReservedUsername => Some(&mut self.is_block_reserved_username),
            FieldKey::ExcludeKeywords => Some(&mut self.is_exclude_keywords),
            FieldKey::UsernameCaseSensitive => Some(&mut self.is_username_case_sensitive),
            FieldKey::AsciiOnly => Some(&mut self.is_ascii_only),
            FieldKey::EmailCaseSensitive => Some(&mut self.is_email_case_sensitive),
            FieldKey::IgnoreDotLocal => Some(&mut self.is_ignore_dot_local),
            FieldKey::AllowPlus => Some(&mut self.is_allow_plus),
            FieldKey::ExcludedKeywords => None,
        }
    }
}

fn flag(value: Option<&Value>) -> bool {
    value.and_then(|v| v.as_bool()).unwrap_or(false)
}

fn field<'a>(section: Option<&'a Value>, name: &str) -> Option<&'a Value> {
    section.and_then(|s| s.get(name))
}

/// Read the login ID settings out of a document.
///
/// Absent or malformed fields take their defaults; this never fails.
pub fn derive_snapshot(document: &ConfigDocument) -> LoginIdSettings {
    let keys: &[Value] = document
        .get("identity.login_id.keys")
        .and_then(|v| v.as_array())
        .map(|v| v.as_slice())
        .unwrap_or(&[]);

    let username = document.get("identity.login_id.types.username");
    let email = document.get("identity.login_id.types.email");
    let excluded_keywords = read_string_list(field(username, "excluded_keywords"));

    LoginIdSettings {
        username_enabled: is_listed(keys, LoginIdKeyType::Username),
        email_enabled: is_listed(keys, LoginIdKeyType::Email),
        phone_number_enabled: is_listed(keys, LoginIdKeyType::Phone),

        is_exclude_keywords: !excluded_keywords.is_empty(),
        excluded_keywords,
        is_block_reserved_username: flag(field(username, "block_reserved_usernames")),
        is_username_case_sensitive: flag(field(username, "case_sensitive")),
        is_ascii_only: flag(field(username, "ascii_only")),

        is_email_case_sensitive: flag(field(email, "case_sensitive")),
        is_ignore_dot_local: flag(field(email, "ignore_dot_sign")),
        is_allow_plus: !flag(field(email, "block_plus_sign")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_document_uses_defaults() {
        let snapshot = derive_snapshot(&ConfigDocument::default());
        assert_eq!(snapshot, LoginIdSettings::default());
        assert!(snapshot.is_allow_plus);
        assert!(!snapshot.is_block_reserved_username);
    }

    #[test]
    fn test_full_document() {
        let doc = ConfigDocument::new(json!({
            "identity": {
                "login_id": {
                    "keys": [
                        {"type": "email", "verification": {"enabled": false}},
                        {"type": "username"}
                    ],
                    "types": {
                        "username": {
                            "block_reserved_usernames": true,
                            "excluded_keywords": ["admin", "root"],
                            "case_sensitive": true,
                            "ascii_only": true
                        },
                        "email": {
                            "case_sensitive": true,
                            "ignore_dot_sign": true,
                            "block_plus_sign": true
                        }
                    }
                }
            }
        }));

        let snapshot = derive_snapshot(&doc);

        assert!(snapshot.username_enabled);
        // Listed with verification off is still enabled
        assert!(snapshot.email_enabled);
        assert!(!snapshot.phone_number_enabled);
        assert_eq!(snapshot.excluded_keywords, vec!["admin", "root"]);
        assert!(snapshot.is_exclude_keywords);
        assert!(snapshot.is_block_reserved_username);
        assert!(snapshot.is_username_case_sensitive);
        assert!(snapshot.is_ascii_only);
        assert!(snapshot.is_email_case_sensitive);
        assert!(snapshot.is_ignore_dot_local);
        assert!(!snapshot.is_allow_plus);
    }

    #[test]
    fn test_malformed_values_fall_back_to_defaults() {
        let doc = ConfigDocument::new(json!({
            "identity": {
                "login_id": {
                    "keys": "email",
                    "types": {
                        "username": {"case_sensitive": "yes", "excluded_keywords": "admin"},
                        "email": ["block_plus_sign"]
                    }
                }
            }
        }));

        assert_eq!(derive_snapshot(&doc), LoginIdSettings::default());
    }

    #[test]
    fn test_field_key_names_roundtrip() {
        for key in FieldKey::ALL {
            assert_eq!(key.as_str().parse::<FieldKey>().unwrap(), key);
        }
        assert_eq!(
            "email.allow_plus_sign".parse::<FieldKey>(),
            Err(FieldError::UnknownField("email.allow_plus_sign".to_string()))
        );
    }

    #[test]
    fn test_set_rejects_wrong_kind() {
        let mut snapshot = LoginIdSettings::default();

        let err = snapshot
            .set(FieldKey::AllowPlus, FieldValue::List(vec![]))
            .unwrap_err();
        assert!(matches!(err, FieldError::TypeMismatch { expected: "boolean", .. }));

        let err = snapshot
            .set(FieldKey::ExcludedKeywords, FieldValue::Bool(true))
            .unwrap_err();
        assert!(matches!(err, FieldError::TypeMismatch { expected: "list", .. }));

        assert_eq!(snapshot, LoginIdSettings::default());
    }

    #[test]
    fn test_changed_fields_is_order_sensitive_for_lists() {
        let mut a = LoginIdSettings::default();
        a.excluded_keywords = vec!["a".into(), "b".into()];
        let mut b = a.clone();
        b.excluded_keywords = vec!["b".into(), "a".into()];
        b.is_allow_plus = false;

        assert_eq!(
            b.changed_fields(&a),
            vec![FieldKey::ExcludedKeywords, FieldKey::AllowPlus]
        );
        assert!(a.changed_fields(&a).is_empty());
    }

    #[test]
    fn test_parse_field_values() {
        assert_eq!(
            FieldValue::parse_for(FieldKey::AllowPlus, "false").unwrap(),
            FieldValue::Bool(false)
        );
        assert_eq!(
            FieldValue::parse_for(FieldKey::ExcludedKeywords, "admin, root").unwrap(),
            FieldValue::List(vec!["admin".into(), " root".into()])
        );
        assert_eq!(
            FieldValue::parse_for(FieldKey::ExcludedKeywords, "").unwrap(),
            FieldValue::List(vec![])
        );
        assert!(FieldValue::parse_for(FieldKey::AsciiOnly, "yes").is_err());
    }

    #[test]
    fn test_snapshot_serializes_with_field_names() {
        let value = serde_json::to_value(LoginIdSettings::default()).unwrap();
        assert_eq!(value["is_allow_plus"], json!(true));
        assert_eq!(value["excluded_keywords"], json!([]));
    }
}
