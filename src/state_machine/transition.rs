//! Pure state transition function
//!
//! Submission gating, completion resolution, and failure handling for one
//! chat turn.

use super::{ChatState, Effect, Event};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ChatState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ChatState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Reasons an event is refused. None of these change state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Message is empty")]
    EmptyInput,
    #[error("A reply is still pending")]
    Busy,
    #[error("No pending completion for submission {0}")]
    StaleResolution(String),
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs, with no I/O.
pub fn transition(state: &ChatState, event: Event) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // Blank input is refused regardless of state
        (_, Event::UserSubmit { message }) if message.text.trim().is_empty() => {
            Err(TransitionError::EmptyInput)
        }

        // Idle + UserSubmit -> AwaitingCompletion
        (ChatState::Idle, Event::UserSubmit { message }) => {
            let submission_id = message.id.clone();
            let text = message.text.clone();
            Ok(TransitionResult::new(ChatState::AwaitingCompletion {
                submission_id: submission_id.clone(),
            })
            .with_effect(Effect::append(message))
            .with_effect(Effect::notify_state_change("awaiting_completion", true))
            .with_effect(Effect::RequestCompletion {
                submission_id,
                text,
            }))
        }

        // One outstanding completion at a time; no queueing
        (ChatState::AwaitingCompletion { .. }, Event::UserSubmit { .. }) => {
            Err(TransitionError::Busy)
        }

        // AwaitingCompletion + CompletionResolved -> Idle
        (
            ChatState::AwaitingCompletion { submission_id },
            Event::CompletionResolved {
                submission_id: resolved_id,
                message,
            },
        ) if *submission_id == resolved_id => Ok(TransitionResult::new(ChatState::Idle)
            .with_effect(Effect::append(message))
            .with_effect(Effect::notify_state_change("idle", false))),

        // AwaitingCompletion + CompletionFailed -> Idle, nothing appended
        (
            ChatState::AwaitingCompletion { submission_id },
            Event::CompletionFailed {
                submission_id: failed_id,
                error,
            },
        ) if *submission_id == failed_id => Ok(TransitionResult::new(ChatState::Idle)
            .with_effect(Effect::LogFailure {
                submission_id: failed_id,
                error,
            })
            .with_effect(Effect::notify_state_change("idle", false))),

        // Resolution while idle, or for an older submission
        (
            _,
            Event::CompletionResolved { submission_id, .. }
            | Event::CompletionFailed { submission_id, .. },
        ) => Err(TransitionError::StaleResolution(submission_id)),
    }
}
