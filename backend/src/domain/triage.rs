//! Conversational triage backed by a generative model.
//!
//! The model is an opaque oracle: whatever goes wrong upstream, the patient
//! gets a polite apology that points to the emergency hotline instead of an
//! error banner.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::Error;
use super::ports::{GenerationRequest, GenerativeModel};

/// Only the most recent messages are forwarded to the model.
pub const MAX_HISTORY_MESSAGES: usize = 20;

/// Longest prompt accepted, in characters.
pub const MAX_PROMPT_CHARS: usize = 4_000;

/// Reply used whenever the model cannot answer.
pub const FALLBACK_REPLY: &str = "Desculpe, estou com dificuldades para responder agora. \
Se for uma emergência, ligue imediatamente para o SAMU (192) ou procure o pronto-socorro mais próximo.";

/// Guidance sent with every request.
pub const SYSTEM_INSTRUCTION: &str = "Você é um assistente de triagem de uma clínica de \
telemedicina. Ofereça orientações preliminares e não diagnósticas, indicando o nível de \
cuidado adequado (autocuidado, consulta online, consulta presencial ou emergência). Nunca \
prescreva medicamentos. Diante de sinais de alarme (dor no peito, falta de ar, desmaio, \
sangramento intenso, confusão súbita) oriente a ligar para o SAMU (192). Responda em \
português, de forma breve e acolhedora.";

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// One turn of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

/// Answer returned to the patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageReply {
    pub text: String,
    /// `true` when the canned apology replaced a model answer.
    pub fallback: bool,
}

impl TriageReply {
    fn fallback() -> Self {
        Self {
            text: FALLBACK_REPLY.to_owned(),
            fallback: true,
        }
    }
}

/// Triage use-case.
#[derive(Clone)]
pub struct TriageService {
    model: Arc<dyn GenerativeModel>,
    system_instruction: String,
}

impl TriageService {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            model,
            system_instruction: SYSTEM_INSTRUCTION.to_owned(),
        }
    }

    /// Replace the default system instruction.
    #[must_use]
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    /// Ask the model to answer `prompt` in the context of `history`.
    ///
    /// # Errors
    /// Returns `invalid_request` when the prompt is blank or too long. Model
    /// failures never surface as errors; they produce the fallback reply.
    pub async fn reply(
        &self,
        history: &[ChatMessage],
        prompt: &str,
    ) -> Result<TriageReply, Error> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(Error::invalid_request("prompt must not be empty"));
        }
        if prompt.chars().count() > MAX_PROMPT_CHARS {
            return Err(Error::invalid_request(format!(
                "prompt must not exceed {MAX_PROMPT_CHARS} characters"
            )));
        }

        let recent = history.len().saturating_sub(MAX_HISTORY_MESSAGES);
        let request = GenerationRequest {
            system_instruction: self.system_instruction.clone(),
            history: history.iter().skip(recent).cloned().collect(),
            prompt: prompt.to_owned(),
        };

        match self.model.generate(&request).await {
            Ok(text) if !text.trim().is_empty() => Ok(TriageReply {
                text,
                fallback: false,
            }),
            Ok(_) => {
                warn!("generative model returned blank text; using fallback reply");
                Ok(TriageReply::fallback())
            }
            Err(error) => {
                warn!(%error, code = ?error.error_code(), "generative model failed; using fallback reply");
                Ok(TriageReply::fallback())
            }
        }
    }
}
