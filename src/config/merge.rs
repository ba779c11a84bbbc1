//! Layer merge for tool settings
//!
//! - Objects: deep-merge by key
//! - Arrays: replace (last wins)
//! - Scalars: override (last wins)

use serde_json::Value;

/// Deep merge `overlay` onto `base`.
///
/// Null in the overlay overrides like any other scalar.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// Merge layers in order; the last layer has the highest precedence
pub fn merge_layers(layers: Vec<Value>) -> Value {
    layers.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_object_merge_keeps_siblings() {
        let base = json!({"bot_protection": {"theme": "auto", "language": "en"}});
        let overlay = json!({"bot_protection": {"theme": "dark"}});

        let result = deep_merge(base, overlay);

        assert_eq!(result["bot_protection"]["theme"], "dark");
        assert_eq!(result["bot_protection"]["language"], "en");
    }

    #[test]
    fn test_array_replaced() {
        let result = deep_merge(json!({"list": ["a", "b", "c"]}), json!({"list": ["x"]}));
        assert_eq!(result["list"], json!(["x"]));
    }

    #[test]
    fn test_null_overrides() {
        let result = deep_merge(json!({"site_key": "abc"}), json!({"site_key": null}));
        assert!(result["site_key"].is_null());
    }

    #[test]
    fn test_merge_layers_precedence() {
        let builtin = json!({"log_filter": "info", "output": {"format": "json", "pretty": true}});
        let user = json!({"log_filter": "debug", "output": {"format": "yaml"}});
        let cli = json!({"log_filter": "warn"});

        let result = merge_layers(vec![builtin, user, cli]);

        assert_eq!(result["log_filter"], "warn");
        assert_eq!(result["output"]["format"], "yaml");
        assert_eq!(result["output"]["pretty"], true);
    }
}
