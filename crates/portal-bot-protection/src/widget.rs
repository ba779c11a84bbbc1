//! Widget render contract

use serde::{Deserialize, Serialize};

use crate::theme::Theme;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetSize {
    #[default]
    Normal,
    Compact,
    Flexible,
}

/// Render options, serialized with the widget's own field names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetOptions {
    pub sitekey: String,
    pub theme: Theme,
    pub language: String,

    /// The token is delivered through the success callback, not a form field
    #[serde(rename = "response-field")]
    pub response_field: bool,

    pub size: WidgetSize,
}

impl WidgetOptions {
    pub fn new(sitekey: impl Into<String>, theme: Theme, language: impl Into<String>) -> Self {
        Self {
            sitekey: sitekey.into(),
            theme,
            language: language.into(),
            response_field: false,
            size: WidgetSize::Normal,
        }
    }
}

/// Callbacks handed to the widget on render
pub struct WidgetCallbacks {
    /// Called with the token when the challenge passes
    pub on_success: Box<dyn Fn(&str)>,

    /// Called with the error code. Returning `true` tells the widget the
    /// error was handled and suppresses its own error UI.
    pub on_error: Box<dyn Fn(&str) -> bool>,

    /// Called with the stale token when it expires
    pub on_expired: Box<dyn Fn(&str)>,
}

/// The widget SDK: wait until loaded, then render into a target
pub trait TurnstileApi {
    type Target;

    fn ready(&self, callback: Box<dyn FnOnce()>);

    fn render(&self, target: &Self::Target, options: WidgetOptions, callbacks: WidgetCallbacks);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_options_use_widget_field_names() {
        let options = WidgetOptions::new("0x4AAAAAAA", Theme::Dark, "en");
        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            json!({
                "sitekey": "0x4AAAAAAA",
                "theme": "dark",
                "language": "en",
                "response-field": false,
                "size": "normal"
            })
        );
    }
}
