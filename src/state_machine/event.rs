//! Events that can occur in a conversation

use crate::conversation::Message;

/// Events that trigger state transitions
///
/// Messages are stamped (id, timestamp) by whoever raises the event, which
/// keeps `transition` free of clocks and randomness.
#[derive(Debug, Clone)]
pub enum Event {
    /// Visitor submitted text
    UserSubmit { message: Message },

    /// The completion for `submission_id` produced a reply
    CompletionResolved {
        submission_id: String,
        message: Message,
    },

    /// The completion for `submission_id` ended without a reply
    CompletionFailed {
        submission_id: String,
        error: String,
    },
}

impl Event {
    pub fn submit(text: impl Into<String>) -> Self {
        Event::UserSubmit {
            message: Message::user(text),
        }
    }

    pub fn resolved(submission_id: impl Into<String>, reply: impl Into<String>) -> Self {
        Event::CompletionResolved {
            submission_id: submission_id.into(),
            message: Message::model(reply),
        }
    }

    pub fn failed(submission_id: impl Into<String>, error: impl Into<String>) -> Self {
        Event::CompletionFailed {
            submission_id: submission_id.into(),
            error: error.into(),
        }
    }
}
