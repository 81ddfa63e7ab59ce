//! # LLM Client Module
//!
//! Completion-model client used by the insight extractor, with built-in rate limiting
//! to keep an audit inside the provider's request quota.
//!
//! ## Key Components
//!
//! - `Client`: Holds the completion model an audit talks to
//! - `RateLimitedCompletionModel`: A wrapper that adds rate limiting to any completion model
//!
//! ## Features
//!
//! - Standard and free-tier quotas
//! - `GEMINI_API_KEY` names the environment variable holding the API key
//! - Tracing spans around limiter waits and completions

use std::num::NonZeroU32;

use governor::{Quota, RateLimiter};
use ratelimited_completion::RateLimitedCompletionModel;
use rig::{completion::CompletionModel, providers::gemini};

#[cfg(test)]
pub mod mock_model;
pub mod ratelimited_completion;

/// Environment variable holding the Gemini API key
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Rate-limited Gemini model used in production
pub type GeminiCompletionModel = RateLimitedCompletionModel<gemini::completion::CompletionModel>;

const STANDARD_MODEL: &str = "gemini-2.0-flash";
const FREE_MODEL: &str = "gemini-2.0-flash-lite";
const STANDARD_REQUESTS_PER_MINUTE: NonZeroU32 = NonZeroU32::new(2000).unwrap();
const FREE_REQUESTS_PER_MINUTE: NonZeroU32 = NonZeroU32::new(30).unwrap();

#[derive(Debug, Clone)]
pub struct Client<C>
where
    C: CompletionModel,
{
    completion_model: C,
}

pub struct RateLimitResponse<T> {
    #[allow(dead_code)]
    response: T,
}

impl Client<GeminiCompletionModel> {
    pub fn new_gemini(gemini_client: gemini::Client) -> Self {
        let limiter = RateLimiter::direct(Quota::per_minute(STANDARD_REQUESTS_PER_MINUTE));
        Self {
            completion_model: RateLimitedCompletionModel::new(
                gemini_client.completion_model(STANDARD_MODEL),
                limiter,
            ),
        }
    }

    pub fn new_gemini_free(gemini_client: gemini::Client) -> Self {
        let limiter = RateLimiter::direct(Quota::per_minute(FREE_REQUESTS_PER_MINUTE));
        Self {
            completion_model: RateLimitedCompletionModel::new(
                gemini_client.completion_model(FREE_MODEL),
                limiter,
            ),
        }
    }
}

impl<C> Client<C>
where
    C: CompletionModel,
{
    /// Wrap an already constructed completion model
    pub fn from_model(completion_model: C) -> Self {
        Self { completion_model }
    }

    pub fn completion(&self) -> &C {
        &self.completion_model
    }

    pub fn into_completion(self) -> C {
        self.completion_model
    }
}

#[cfg(test)]
mod tests {
    use super::mock_model::MockCompletionModel;
    use super::*;

    #[test]
    fn test_client_wraps_model() {
        let client = Client::from_model(MockCompletionModel::new());
        let _model: &MockCompletionModel = client.completion();
        let _owned: MockCompletionModel = client.into_completion();
    }

    #[test]
    fn test_quotas() {
        assert_eq!(STANDARD_REQUESTS_PER_MINUTE.get(), 2000);
        assert_eq!(FREE_REQUESTS_PER_MINUTE.get(), 30);
    }
}
