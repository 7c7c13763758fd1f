//! Wire types for the `generateContent` endpoint.

use serde::{Deserialize, Serialize};

use crate::domain::ports::GenerationRequest;
use crate::domain::triage::{ChatMessage, ChatRole};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GenerateContentRequest {
    pub(super) contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) system_instruction: Option<Content>,
}

#[derive(Debug, Serialize)]
pub(super) struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) role: Option<&'static str>,
    pub(super) parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
pub(super) struct Part {
    pub(super) text: String,
}

impl Content {
    fn text(role: Option<&'static str>, text: &str) -> Self {
        Self {
            role,
            parts: vec![Part {
                text: text.to_owned(),
            }],
        }
    }
}

fn role_name(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "user",
        ChatRole::Model => "model",
    }
}

impl From<&GenerationRequest> for GenerateContentRequest {
    fn from(request: &GenerationRequest) -> Self {
        let mut contents: Vec<Content> = request
            .history
            .iter()
            .map(|ChatMessage { role, text }| Content::text(Some(role_name(*role)), text))
            .collect();
        contents.push(Content::text(Some("user"), &request.prompt));
        let system_instruction = Some(request.system_instruction.trim())
            .filter(|text| !text.is_empty())
            .map(|text| Content::text(None, text));
        Self {
            contents,
            system_instruction,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct GenerateContentResponse {
    #[serde(default)]
    pub(super) candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Candidate {
    pub(super) content: Option<ContentResponse>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ContentResponse {
    #[serde(default)]
    pub(super) parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PartResponse {
    pub(super) text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate that has any.
    pub(super) fn into_text(self) -> Option<String> {
        self.candidates.into_iter().find_map(|candidate| {
            let text: String = candidate
                .content?
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect();
            Some(text).filter(|text| !text.trim().is_empty())
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorWrapper {
    pub(super) error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorBody {
    pub(super) message: Option<String>,
    pub(super) status: Option<String>,
}
