//! Field-scoped patching of the login ID settings
//!
//! Only fields that differ between the initial and current snapshot are
//! written. Containers are created on demand when a value has to be stored;
//! removing a list field never creates them.

use serde_json::{Map, Value};

use super::keys::{get_or_create_entry, set_verification_enabled, LoginIdKeyType};
use super::lists::{effective_list, set_field_if_list_non_empty};
use super::snapshot::{FieldKey, LoginIdSettings};
use crate::document::ConfigDocument;

const LOGIN_ID_PATH: [&str; 2] = ["identity", "login_id"];
const USERNAME_PATH: [&str; 4] = ["identity", "login_id", "types", "username"];
const EMAIL_PATH: [&str; 4] = ["identity", "login_id", "types", "email"];

/// Apply the changes between `initial` and `current` to `document`.
///
/// The input document is left untouched; the result is a new document in
/// which every field not covered by a change keeps its original value.
pub fn compute_and_apply_patch(
    document: &ConfigDocument,
    initial: &LoginIdSettings,
    current: &LoginIdSettings,
) -> ConfigDocument {
    let changed = current.changed_fields(initial);
    if changed.is_empty() {
        return document.clone();
    }

    let mut root = document.as_value().clone();
    let mut keywords_changed = false;

    for key in &changed {
        match key {
            FieldKey::UsernameEnabled | FieldKey::EmailEnabled | FieldKey::PhoneNumberEnabled => {
                if let Some(key_type) = key.key_type() {
                    let enabled = match key_type {
                        LoginIdKeyType::Username => current.username_enabled,
                        LoginIdKeyType::Email => current.email_enabled,
                        LoginIdKeyType::Phone => current.phone_number_enabled,
                    };
                    set_key_enabled(&mut root, key_type, enabled);
                }
            }
            FieldKey::ExcludedKeywords | FieldKey::ExcludeKeywords => keywords_changed = true,
            FieldKey::BlockReservedUsername => set_flag(
                &mut root,
                &USERNAME_PATH,
                "block_reserved_usernames",
                current.is_block_reserved_username,
            ),
            FieldKey::UsernameCaseSensitive => set_flag(
                &mut root,
                &USERNAME_PATH,
                "case_sensitive",
                current.is_username_case_sensitive,
            ),
            FieldKey::AsciiOnly => {
                set_flag(&mut root, &USERNAME_PATH, "ascii_only", current.is_ascii_only)
            }
            FieldKey::EmailCaseSensitive => set_flag(
                &mut root,
                &EMAIL_PATH,
                "case_sensitive",
                current.is_email_case_sensitive,
            ),
            FieldKey::IgnoreDotLocal => set_flag(
                &mut root,
                &EMAIL_PATH,
                "ignore_dot_sign",
                current.is_ignore_dot_local,
            ),
            // Stored inverted: allowing plus means not blocking it
            FieldKey::AllowPlus => {
                set_flag(&mut root, &EMAIL_PATH, "block_plus_sign", !current.is_allow_plus)
            }
        }
    }

    if keywords_changed {
        let list = effective_list(&current.excluded_keywords, current.is_exclude_keywords);
        tracing::debug!(count = list.len(), "writing excluded_keywords");
        if list.is_empty() {
            if let Some(username) = existing_object_mut(&mut root, &USERNAME_PATH) {
                set_field_if_list_non_empty(username, "excluded_keywords", list);
            }
        } else {
            let username = ensure_path(&mut root, &USERNAME_PATH);
            set_field_if_list_non_empty(username, "excluded_keywords", list);
        }
    }

    tracing::debug!(
        changed = ?changed.iter().map(FieldKey::as_str).collect::<Vec<_>>(),
        "applied login ID settings patch"
    );

    ConfigDocument::new(root)
}

fn set_flag(root: &mut Value, path: &[&str], field: &str, value: bool) {
    tracing::debug!(path = %path.join("."), field, value, "writing flag");
    ensure_path(root, path).insert(field.to_string(), Value::Bool(value));
}

/// Enabling inserts a missing entry; either direction sets
/// `verification.enabled`. Entries are never removed.
fn set_key_enabled(root: &mut Value, key_type: LoginIdKeyType, enabled: bool) {
    tracing::debug!(key_type = %key_type, enabled, "toggling login ID key");
    let login_id = ensure_path(root, &LOGIN_ID_PATH);
    let keys = ensure_array(
        login_id
            .entry("keys")
            .or_insert_with(|| Value::Array(Vec::new())),
    );
    if let Some(entry) = get_or_create_entry(keys, key_type) {
        set_verification_enabled(entry, enabled);
    }
}

/// Walk `path` from the root, turning absent or non-object nodes into objects
fn ensure_path<'a>(root: &'a mut Value, path: &[&str]) -> &'a mut Map<String, Value> {
    let mut current = ensure_object(root);
    for part in path {
        let child = current
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        current = ensure_object(child);
    }
    current
}

fn existing_object_mut<'a>(root: &'a mut Value, path: &[&str]) -> Option<&'a mut Map<String, Value>> {
    let mut current = root;
    for part in path {
        current = current.as_object_mut()?.get_mut(*part)?;
    }
    current.as_object_mut()
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced with an object"),
    }
}

fn ensure_array(value: &mut Value) -> &mut Vec<Value> {
    if !value.is_array() {
        *value = Value::Array(Vec::new());
    }
    match value {
        Value::Array(items) => items,
        _ => unreachable!("value was just replaced with an array"),
    }
}
