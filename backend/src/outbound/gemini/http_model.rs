//! Reqwest-backed Gemini client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use super::dto::{ErrorWrapper, GenerateContentRequest, GenerateContentResponse};
use crate::domain::ports::{GenerationRequest, GenerativeModel, GenerativeModelError};
use crate::outbound::status_message;

/// Public REST endpoint hosting the models.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// `GenerativeModel` implementation calling `{base}/{model}:generateContent`.
pub struct GeminiHttpModel {
    client: Client,
    base_url: Url,
    model: String,
    api_key: String,
}

impl GeminiHttpModel {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base_url: Url,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self) -> Result<Url, GenerativeModelError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| GenerativeModelError::transport("model base URL cannot carry a path"))?
            .pop_if_empty()
            .push(&format!("{}:generateContent", self.model));
        Ok(url)
    }
}

#[async_trait]
impl GenerativeModel for GeminiHttpModel {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerativeModelError> {
        let body = GenerateContentRequest::from(request);
        debug!(model = %self.model, turns = body.contents.len(), "calling generative model");
        let response = self
            .client
            .post(self.endpoint()?)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&body)
            .send()
            .await
            .map_err(|error| GenerativeModelError::transport(error.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|error| GenerativeModelError::transport(error.to_string()))?;
        if !status.is_success() {
            return Err(map_status_error(status, bytes.as_ref()));
        }

        let decoded: GenerateContentResponse = serde_json::from_slice(bytes.as_ref())
            .map_err(|error| GenerativeModelError::transport(format!("invalid response JSON: {error}")))?;
        decoded
            .into_text()
            .ok_or_else(|| GenerativeModelError::empty_response("no text in candidates"))
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> GenerativeModelError {
    let message = serde_json::from_slice::<ErrorWrapper>(body)
        .ok()
        .and_then(|wrapper| {
            let text = wrapper.error.message?;
            Some(match wrapper.error.status {
                Some(code) if !code.is_empty() => format!("{code}: {text}"),
                _ => text,
            })
        })
        .unwrap_or_else(|| status_message(status, body));

    match status {
        StatusCode::TOO_MANY_REQUESTS => GenerativeModelError::rate_limited(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            GenerativeModelError::unavailable(message)
        }
        _ => GenerativeModelError::transport(message),
    }
}
