//! Bot protection widget contract
//!
//! Wires a Turnstile widget's callbacks to bot protection events. The widget
//! SDK is injected as a [`TurnstileApi`] instead of being reached through a
//! global.

pub mod controller;
pub mod event;
pub mod theme;
pub mod widget;

pub use controller::{ColorSchemeSource, FixedColorScheme, TurnstileController};
pub use event::{BotProtectionEvent, BotProtectionEventSink, TracingEventSink};
pub use theme::Theme;
pub use widget::{TurnstileApi, WidgetCallbacks, WidgetOptions, WidgetSize};
