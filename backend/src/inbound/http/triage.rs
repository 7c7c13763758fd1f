//! Triage chat endpoint.
//!
//! ```text
//! POST /api/v1/triage/chat {"history":[{"role":"user","text":"Oi"}],"prompt":"Estou com febre"}
//! ```

use actix_web::{post, web};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::triage::{ChatMessage, ChatRole, TriageReply};
use crate::domain::trial::TrialStatus;
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::trial::require_active_trial;

/// Author of a chat turn.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChatRoleBody {
    User,
    Model,
}

/// One prior turn of the conversation.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageBody {
    pub role: ChatRoleBody,
    pub text: String,
}

impl From<ChatMessageBody> for ChatMessage {
    fn from(value: ChatMessageBody) -> Self {
        let role = match value.role {
            ChatRoleBody::User => ChatRole::User,
            ChatRoleBody::Model => ChatRole::Model,
        };
        Self {
            role,
            text: value.text,
        }
    }
}

/// Request body for `POST /api/v1/triage/chat`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TriageRequest {
    #[serde(default)]
    pub history: Vec<ChatMessageBody>,
    #[schema(example = "Estou com febre há dois dias")]
    pub prompt: String,
}

/// Assistant answer plus the countdown it was charged against.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TriageResponse {
    pub reply: String,
    /// `true` when the assistant could not answer and an apology was sent.
    pub fallback: bool,
    pub trial: TrialStatus,
}

/// Ask the triage assistant a question.
///
/// The first call starts the trial countdown; calls after it has run out
/// are refused.
#[utoipa::path(
    post,
    path = "/api/v1/triage/chat",
    request_body = TriageRequest,
    responses(
        (status = 200, description = "Assistant reply", body = TriageResponse),
        (status = 400, description = "Invalid prompt", body = Error),
        (status = 403, description = "Trial expired", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["triage"],
    operation_id = "triageChat",
    security([])
)]
#[post("/triage/chat")]
pub async fn triage_chat(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<TriageRequest>,
) -> ApiResult<web::Json<TriageResponse>> {
    let trial = require_active_trial(&state, &session)?;
    let TriageRequest { history, prompt } = payload.into_inner();
    let history: Vec<ChatMessage> = history.into_iter().map(ChatMessage::from).collect();
    let TriageReply { text, fallback } = state.triage.reply(&history, &prompt).await?;
    Ok(web::Json(TriageResponse {
        reply: text,
        fallback,
        trial: trial.status(state.clock.utc()),
    }))
}
