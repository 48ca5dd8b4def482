//! Completion client
//!
//! Turns one visitor utterance into one displayable reply. Every failure
//! (missing credential, transport, provider rejection, empty output) is
//! normalized into a fixed fallback string, so callers never see an error.

use crate::llm::{LlmMessage, LlmRequest, LlmService, SystemContent};
use crate::portfolio::Portfolio;
use crate::system_prompt::build_system_instruction;
use std::sync::Arc;

/// Sampling temperature for every request
pub const TEMPERATURE: f32 = 0.7;

/// Reply when the service answers but produces no text
pub const EMPTY_REPLY_FALLBACK: &str = "I'm sorry, I couldn't generate a response at the moment.";

/// Reply when the service cannot be reached or refuses the request
pub const UNAVAILABLE_FALLBACK: &str =
    "I'm having trouble connecting to my brain right now. Please check the console or try again later.";

pub struct CompletionClient {
    llm: Arc<dyn LlmService>,
    system_instruction: String,
}

impl CompletionClient {
    pub fn new(llm: Arc<dyn LlmService>, portfolio: &Portfolio) -> Self {
        Self {
            llm,
            system_instruction: build_system_instruction(portfolio),
        }
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    /// Only the latest utterance is sent; earlier turns are never replayed.
    fn build_request(&self, user_text: &str) -> LlmRequest {
        LlmRequest {
            system: vec![SystemContent::new(self.system_instruction.clone())],
            messages: vec![LlmMessage::user(user_text)],
            temperature: Some(TEMPERATURE),
            max_tokens: None,
        }
    }

    /// Generate a reply. Never fails.
    pub async fn complete(&self, user_text: &str) -> String {
        let request = self.build_request(user_text);

        match self.llm.complete(&request).await {
            Ok(response) => match response.reply() {
                Some(text) => text.to_string(),
                None => {
                    tracing::warn!(
                        model = %self.llm.model_id(),
                        finish_reason = response.finish_reason.as_deref().unwrap_or("none"),
                        "Completion returned no text, using fallback"
                    );
                    EMPTY_REPLY_FALLBACK.to_string()
                }
            },
            // The service layer already logged the failure at error level
            Err(e) => {
                tracing::warn!(
                    model = %self.llm.model_id(),
                    kind = ?e.kind,
                    "Completion failed, using fallback"
                );
                UNAVAILABLE_FALLBACK.to_string()
            }
        }
    }
}
