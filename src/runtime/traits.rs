//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use crate::completion::CompletionClient;
use async_trait::async_trait;
use std::sync::Arc;

/// Source of replies for visitor utterances
#[async_trait]
pub trait Completer: Send + Sync {
    /// Produce a displayable reply. Implementations absorb their own failures.
    async fn complete(&self, user_text: &str) -> String;
}

#[async_trait]
impl<T: Completer + ?Sized> Completer for Arc<T> {
    async fn complete(&self, user_text: &str) -> String {
        (**self).complete(user_text).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

#[async_trait]
impl Completer for CompletionClient {
    async fn complete(&self, user_text: &str) -> String {
        CompletionClient::complete(self, user_text).await
    }
}
