//! Effects produced by state transitions

use crate::conversation::Message;
use serde_json::{json, Value};

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append a message to the transcript
    AppendMessage { message: Message },

    /// Ask the completion client for a reply to `text`
    RequestCompletion { submission_id: String, text: String },

    /// Record a failed completion for diagnostics
    LogFailure { submission_id: String, error: String },

    /// Notify connected clients
    NotifyClient { event_type: String, data: Value },
}

impl Effect {
    pub fn append(message: Message) -> Self {
        Effect::AppendMessage { message }
    }

    pub fn notify_state_change(state: &str, pending: bool) -> Self {
        Effect::NotifyClient {
            event_type: "state_change".to_string(),
            data: json!({
                "state": state,
                "pending": pending
            }),
        }
    }
}
