//! Tool settings
//!
//! Layered merge, lowest precedence first:
//! 1. Built-in defaults
//! 2. User config (`--config`, `$PORTAL_SETTINGS_CONFIG`, or
//!    `~/.config/portal-settings/config.toml`)
//! 3. CLI flags

mod defaults;
mod effective;
mod merge;

pub use defaults::BuiltinDefaults;
pub use effective::{
    BotProtectionSettings, ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig,
    OutputSettings, ToolConfig, CONFIG_ENV_VAR,
};
pub use merge::{deep_merge, merge_layers};
