//! Chat turn state

use serde::{Deserialize, Serialize};

/// Where a conversation is in its current turn
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatState {
    /// Ready for the next submission
    #[default]
    Idle,
    /// One completion is outstanding for the user message `submission_id`
    AwaitingCompletion { submission_id: String },
}

impl ChatState {
    /// The pending flag: true exactly while a completion is outstanding
    pub fn is_pending(&self) -> bool {
        matches!(self, ChatState::AwaitingCompletion { .. })
    }

    pub fn submission_id(&self) -> Option<&str> {
        match self {
            ChatState::AwaitingCompletion { submission_id } => Some(submission_id),
            ChatState::Idle => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ChatState::Idle => "idle",
            ChatState::AwaitingCompletion { .. } => "awaiting_completion",
        }
    }
}
