//! Bot protection events
//!
//! The only three signals the widget integration emits.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BotProtectionEvent {
    /// Challenge passed
    Verified { token: String },
    /// Widget reported an error
    Failed { error_code: String },
    /// A previously issued token expired
    Expired { token: String },
}

impl BotProtectionEvent {
    /// Event name as dispatched to listeners
    pub fn name(&self) -> &'static str {
        match self {
            BotProtectionEvent::Verified { .. } => "bot-protection:verified",
            BotProtectionEvent::Failed { .. } => "bot-protection:failed",
            BotProtectionEvent::Expired { .. } => "bot-protection:expired",
        }
    }
}

/// Receives events from the widget controller
pub trait BotProtectionEventSink {
    fn dispatch(&self, event: BotProtectionEvent);
}

/// Sink that only logs events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl BotProtectionEventSink for TracingEventSink {
    fn dispatch(&self, event: BotProtectionEvent) {
        match &event {
            // Tokens are credentials; log only their length
            BotProtectionEvent::Verified { token } | BotProtectionEvent::Expired { token } => {
                tracing::info!(event = event.name(), token_len = token.len(), "bot protection event");
            }
            BotProtectionEvent::Failed { error_code } => {
                tracing::warn!(event = event.name(), error_code = %error_code, "bot protection event");
            }
        }
    }
}
