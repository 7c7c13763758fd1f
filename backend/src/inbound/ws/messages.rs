//! Wire-level frames for the live triage socket.
//!
//! ```text
//! -> {"type":"prompt","prompt":"Estou com febre","history":[...]}
//! <- {"type":"reply","text":"...","fallback":false}
//! -> {"type":"interrupt"}
//! <- {"type":"interrupted"}
//! <- {"type":"error","code":"invalid_request","message":"..."}
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::triage::{ChatMessage, TriageReply};
use crate::domain::{Error, ErrorCode};

/// Frames sent by the browser.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientFrame {
    /// Ask the assistant a question. A supplied `history` replaces the
    /// conversation kept by the session.
    Prompt {
        #[serde(default)]
        history: Option<Vec<ChatMessage>>,
        prompt: String,
    },
    /// Drop the reply in flight, if any.
    Interrupt,
}

/// Frames sent by the server.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerFrame {
    Reply { text: String, fallback: bool },
    Interrupted,
    Error { code: ErrorCode, message: String },
}

impl From<TriageReply> for ServerFrame {
    fn from(value: TriageReply) -> Self {
        Self::Reply {
            text: value.text,
            fallback: value.fallback,
        }
    }
}

impl From<&Error> for ServerFrame {
    fn from(value: &Error) -> Self {
        let message = match value.code() {
            ErrorCode::InternalError => "Internal server error".to_owned(),
            _ => value.message().to_owned(),
        };
        Self::Error {
            code: value.code(),
            message,
        }
    }
}
