//! Driven port for the generative-AI text endpoint.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::triage::ChatMessage;

/// Everything the model needs to produce one reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub system_instruction: String,
    pub history: Vec<ChatMessage>,
    pub prompt: String,
}

define_port_error! {
    /// Errors raised by a generative model.
    pub enum GenerativeModelError {
        /// No model is configured for this deployment.
        Unavailable { message: String } as ServiceUnavailable =>
            "generative model unavailable: {message}",
        /// The provider throttled the request.
        RateLimited { message: String } as ServiceUnavailable =>
            "generative model rate limited: {message}",
        /// The request could not be delivered or the provider failed.
        Transport { message: String } as ServiceUnavailable =>
            "generative model request failed: {message}",
        /// The provider answered without usable text.
        EmptyResponse { message: String } as InternalError =>
            "generative model returned no text: {message}",
    }
}

/// Port for text generation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Produce the model's reply to `request.prompt`.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerativeModelError>;
}

/// Stand-in used when no API key is configured; every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredModel;

#[async_trait]
impl GenerativeModel for UnconfiguredModel {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerativeModelError> {
        Err(GenerativeModelError::unavailable("no API key configured"))
    }
}
