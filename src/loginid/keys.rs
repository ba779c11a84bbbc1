//! Login ID key entries (`identity.login_id.keys`)
//!
//! A login ID type is enabled when an entry with its `type` is present in the
//! keys list, whatever else the entry holds. The nested `verification.enabled`
//! flag is a separate setting and does not affect membership.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Kind of user-identifying credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginIdKeyType {
    Username,
    Email,
    Phone,
}

impl LoginIdKeyType {
    pub const ALL: [LoginIdKeyType; 3] = [
        LoginIdKeyType::Username,
        LoginIdKeyType::Email,
        LoginIdKeyType::Phone,
    ];

    /// Value of the entry's `type` field
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginIdKeyType::Username => "username",
            LoginIdKeyType::Email => "email",
            LoginIdKeyType::Phone => "phone",
        }
    }
}

impl fmt::Display for LoginIdKeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn entry_has_type(entry: &Value, key_type: LoginIdKeyType) -> bool {
    entry.get("type").and_then(|t| t.as_str()) == Some(key_type.as_str())
}

/// Whether an entry for `key_type` is listed
pub(crate) fn is_listed(keys: &[Value], key_type: LoginIdKeyType) -> bool {
    keys.iter().any(|entry| entry_has_type(entry, key_type))
}

/// Find the entry for `key_type`, appending `{ "type": ... }` if there is none
pub(crate) fn get_or_create_entry(
    keys: &mut Vec<Value>,
    key_type: LoginIdKeyType,
) -> Option<&mut Map<String, Value>> {
    if !is_listed(keys, key_type) {
        let mut entry = Map::new();
        entry.insert("type".to_string(), Value::String(key_type.as_str().to_string()));
        keys.push(Value::Object(entry));
    }

    keys.iter_mut()
        .filter_map(Value::as_object_mut)
        .find(|entry| entry.get("type").and_then(|t| t.as_str()) == Some(key_type.as_str()))
}

/// Set `verification.enabled` on an entry, creating `verification` if needed
pub(crate) fn set_verification_enabled(entry: &mut Map<String, Value>, enabled: bool) {
    let verification = entry
        .entry("verification")
        .or_insert_with(|| Value::Object(Map::new()));
    if !verification.is_object() {
        *verification = Value::Object(Map::new());
    }
    if let Value::Object(map) = verification {
        map.insert("enabled".to_string(), Value::Bool(enabled));
    }
}
