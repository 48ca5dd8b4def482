//! Conversation store
//!
//! Owns the transcript and the pending flag for one visitor session. All
//! mutation goes through the pure `transition` function; this type only
//! applies the resulting state and the `AppendMessage` effects, and hands
//! every effect back so the runtime can act on the rest.

pub mod message;

pub use message::Message;

use crate::state_machine::{transition, ChatState, Effect, Event, TransitionError};
use serde::Serialize;

/// What the chat widget needs to draw itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderState {
    pub messages: Vec<Message>,
    /// Drives the loading indicator
    pub pending: bool,
    /// Id of the newest message, the element to keep scrolled into view
    pub scroll_anchor: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
    state: ChatState,
}

impl Conversation {
    /// Start a conversation seeded with the assistant's greeting
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::model(greeting)],
            state: ChatState::Idle,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }

    /// Submit visitor text.
    ///
    /// Blank text or a submission while a reply is pending is refused with no
    /// state change. On success the returned effects include exactly one
    /// `RequestCompletion`.
    pub fn submit(&mut self, text: &str) -> Result<Vec<Effect>, TransitionError> {
        self.apply(Event::submit(text))
    }

    /// Close the pending turn with the model's reply
    pub fn on_completion_resolved(
        &mut self,
        submission_id: &str,
        reply: impl Into<String>,
    ) -> Result<Vec<Effect>, TransitionError> {
        self.apply(Event::resolved(submission_id, reply))
    }

    /// Close the pending turn without a reply
    pub fn on_completion_failed(
        &mut self,
        submission_id: &str,
        error: impl Into<String>,
    ) -> Result<Vec<Effect>, TransitionError> {
        self.apply(Event::failed(submission_id, error))
    }

    pub fn apply(&mut self, event: Event) -> Result<Vec<Effect>, TransitionError> {
        let result = transition(&self.state, event)?;

        for effect in &result.effects {
            if let Effect::AppendMessage { message } = effect {
                self.messages.push(message.clone());
            }
        }
        self.state = result.new_state;

        Ok(result.effects)
    }

    pub fn snapshot(&self) -> RenderState {
        RenderState {
            messages: self.messages.clone(),
            pending: self.is_pending(),
            scroll_anchor: self.messages.last().map(|m| m.id.clone()),
        }
    }
}
