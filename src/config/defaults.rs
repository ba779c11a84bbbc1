//! Built-in defaults (layer 1)

use serde::{Deserialize, Serialize};

use crate::document::DocumentFormat;

/// Built-in default tool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Tracing filter directive (default: "portal_settings=info")
    pub log_filter: String,

    /// Output format for documents printed to stdout (default: json)
    pub output_format: DocumentFormat,

    /// Pretty-print JSON output (default: true)
    pub pretty: bool,

    /// Widget theme (default: "auto")
    pub bot_protection_theme: String,

    /// Widget language (default: "auto")
    pub bot_protection_language: String,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            log_filter: "portal_settings=info".to_string(),
            output_format: DocumentFormat::Json,
            pretty: true,
            bot_protection_theme: "auto".to_string(),
            bot_protection_language: "auto".to_string(),
        }
    }
}

impl BuiltinDefaults {
    /// Convert to a JSON layer for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "log_filter": self.log_filter,
            "output": {
                "format": self.output_format,
                "pretty": self.pretty
            },
            "bot_protection": {
                "theme": self.bot_protection_theme,
                "language": self.bot_protection_language
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_value() {
        let value = BuiltinDefaults::default().to_value();

        assert_eq!(value["log_filter"], "portal_settings=info");
        assert_eq!(value["output"]["format"], "json");
        assert_eq!(value["output"]["pretty"], true);
        assert_eq!(value["bot_protection"]["theme"], "auto");
        assert!(value["bot_protection"].get("site_key").is_none());
    }
}
