//! Session runtime executor

use super::traits::Completer;
use super::{SessionInput, SseEvent};

use crate::conversation::{Conversation, RenderState};
use crate::state_machine::{Effect, TransitionError};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};

/// Generic session runtime that can work with any completer implementation
pub struct ConversationRuntime<C>
where
    C: Completer + 'static,
{
    session_id: String,
    conversation: Conversation,
    completer: Arc<C>,
    input_rx: mpsc::Receiver<SessionInput>,
    /// Weak so the loop ends once the session handle is dropped
    input_tx: mpsc::WeakSender<SessionInput>,
    broadcast_tx: broadcast::Sender<SseEvent>,
    snapshot_tx: watch::Sender<RenderState>,
}

impl<C> ConversationRuntime<C>
where
    C: Completer + 'static,
{
    pub fn new(
        session_id: String,
        conversation: Conversation,
        completer: C,
        input_rx: mpsc::Receiver<SessionInput>,
        input_tx: mpsc::WeakSender<SessionInput>,
        broadcast_tx: broadcast::Sender<SseEvent>,
        snapshot_tx: watch::Sender<RenderState>,
    ) -> Self {
        Self {
            session_id,
            conversation,
            completer: Arc::new(completer),
            input_rx,
            input_tx,
            broadcast_tx,
            snapshot_tx,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(session_id = %self.session_id, "Starting session runtime");

        // Process inputs one at a time; completions arrive on the same channel
        while let Some(input) = self.input_rx.recv().await {
            match input {
                SessionInput::Submit { text, ack } => {
                    let result = self.conversation.submit(&text);
                    let accepted = self.apply("user_submit", result);
                    // Caller may have gone away; the submission still stands
                    let _ = ack.send(accepted);
                }
                SessionInput::Resolved {
                    submission_id,
                    reply,
                } => {
                    let result = self.conversation.on_completion_resolved(&submission_id, reply);
                    self.apply("completion_resolved", result);
                }
                SessionInput::Failed {
                    submission_id,
                    error,
                } => {
                    let result = self.conversation.on_completion_failed(&submission_id, error);
                    self.apply("completion_failed", result);
                }
            }
        }

        tracing::info!(session_id = %self.session_id, "Session runtime stopped");
    }

    /// Act on the outcome of one store operation. Refused operations change
    /// nothing and are only logged.
    fn apply(&mut self, operation: &str, result: Result<Vec<Effect>, TransitionError>) -> bool {
        match result {
            Ok(effects) => {
                tracing::debug!(
                    session_id = %self.session_id,
                    operation,
                    state = self.conversation.state().display_name(),
                    submission_id = ?self.conversation.state().submission_id(),
                    messages = self.conversation.messages().len(),
                    "Conversation updated"
                );
                for effect in effects {
                    self.execute_effect(effect);
                }
                self.snapshot_tx.send_replace(self.conversation.snapshot());
                true
            }
            Err(e) => {
                tracing::debug!(
                    session_id = %self.session_id,
                    operation,
                    reason = %e,
                    "Input ignored"
                );
                false
            }
        }
    }

    fn execute_effect(&self, effect: Effect) {
        match effect {
            Effect::AppendMessage { message } => {
                let _ = self.broadcast_tx.send(SseEvent::Message { message });
            }

            Effect::RequestCompletion {
                submission_id,
                text,
            } => self.spawn_completion(submission_id, text),

            Effect::LogFailure {
                submission_id,
                error,
            } => {
                tracing::error!(
                    session_id = %self.session_id,
                    submission_id = %submission_id,
                    error = %error,
                    "Completion ended without a reply"
                );
                let _ = self.broadcast_tx.send(SseEvent::Error {
                    message: "The assistant could not reply. Please try again.".to_string(),
                });
            }

            Effect::NotifyClient { event_type, data } => match event_type.as_str() {
                "state_change" => {
                    let _ = self.broadcast_tx.send(SseEvent::StateChange { state: data });
                }
                other => {
                    tracing::warn!(event_type = other, "Unknown client notification");
                }
            },
        }
    }

    /// Run the completion as a background task and feed the outcome back in.
    ///
    /// The completer never fails by contract; a task that panics or is
    /// aborted still closes the turn through `SessionInput::Failed`.
    fn spawn_completion(&self, submission_id: String, text: String) {
        let Some(input_tx) = self.input_tx.upgrade() else {
            tracing::debug!(session_id = %self.session_id, "Session closed, skipping completion");
            return;
        };
        let completer = Arc::clone(&self.completer);
        let session_id = self.session_id.clone();

        tokio::spawn(async move {
            tracing::info!(session_id = %session_id, "Requesting completion (background)");

            let task = tokio::spawn(async move { completer.complete(&text).await });
            let input = match task.await {
                Ok(reply) => SessionInput::Resolved {
                    submission_id,
                    reply,
                },
                Err(e) => SessionInput::Failed {
                    submission_id,
                    error: format!("Completion task ended abnormally: {e}"),
                },
            };

            if input_tx.send(input).await.is_err() {
                tracing::debug!(session_id = %session_id, "Runtime gone before completion landed");
            }
        });
    }
}
