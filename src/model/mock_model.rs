//! # Mock Completion Model for Testing
//!
//! Provides a `MockCompletionModel` that implements the `CompletionModel` trait
//! for use in tests. It returns a predefined response or error and counts how often it
//! was called, so backend behavior can be simulated without API calls.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rig::{
    completion::{
        AssistantContent, CompletionError, CompletionModel, CompletionRequest, CompletionResponse,
    },
    one_or_many::OneOrMany,
};
use tokio::sync::Mutex;

/// A mock completion model for testing purposes.
#[derive(Debug, Clone, Default)]
pub struct MockCompletionModel {
    response: Arc<Mutex<Option<OneOrMany<AssistantContent>>>>,
    error: Arc<Mutex<Option<String>>>,
    calls: Arc<AtomicUsize>,
}

impl MockCompletionModel {
    /// Creates a new mock model that will return an empty text response.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the response that the mock model should return.
    pub async fn set_response(&self, response: OneOrMany<AssistantContent>) {
        *self.response.lock().await = Some(response);
    }

    /// Helper to create a simple text response.
    pub async fn set_text_response(&self, text: &str) {
        self.set_response(OneOrMany::one(AssistantContent::text(text)))
            .await;
    }

    /// Makes every following call fail with a provider error.
    pub async fn set_error(&self, message: &str) {
        *self.error.lock().await = Some(message.to_string());
    }

    /// Number of completion requests received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CompletionModel for MockCompletionModel {
    type Response = String;

    async fn completion(
        &self,
        _completion_request: CompletionRequest,
    ) -> Result<CompletionResponse<Self::Response>, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = self.error.lock().await.clone() {
            return Err(CompletionError::ProviderError(message));
        }

        let choice = self
            .response
            .lock()
            .await
            .clone()
            .unwrap_or_else(|| OneOrMany::one(AssistantContent::text("")));
        Ok(CompletionResponse {
            choice,
            raw_response: String::new(),
        })
    }
}
