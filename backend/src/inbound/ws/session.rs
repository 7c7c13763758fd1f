//! Per-connection live triage session.
//!
//! Keeps WebSocket framing and heartbeats at the edge while deferring the
//! conversation to [`TriageService`]. One reply may be in flight at a time;
//! an `interrupt` frame aborts it. The socket pings every 5s and is
//! considered idle after 10s without client traffic. Tests shorten these
//! intervals.

use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use mockable::Clock;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, warn};

use crate::domain::Error;
use crate::domain::triage::{ChatMessage, MAX_HISTORY_MESSAGES, TriageReply, TriageService};
use crate::domain::trial::TrialSession;
use crate::inbound::ws::messages::{ClientFrame, ServerFrame};

/// Time between heartbeats to the client (5s in production, shorter in tests).
#[cfg(not(test))]
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

/// Max idle time before disconnecting the client (10s in production, shorter in tests).
#[cfg(not(test))]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
const CLIENT_TIMEOUT: Duration = Duration::from_millis(100);

type PendingReply = JoinHandle<Result<TriageReply, Error>>;

pub(super) async fn handle_ws_session(
    triage: TriageService,
    clock: Arc<dyn Clock>,
    trial: TrialSession,
    session: Session,
    stream: MessageStream,
) {
    WsSession::new(triage, clock, trial).run(session, stream).await;
}

enum SessionError {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    HeartbeatTimeout,
    Protocol(ProtocolError),
    InvalidPayload,
    TrialExpired,
    Network(Closed),
}

enum CloseAction {
    None,
    Close(Option<CloseReason>),
}

struct InFlight {
    prompt: String,
    handle: PendingReply,
}

struct WsSession {
    triage: TriageService,
    clock: Arc<dyn Clock>,
    trial: TrialSession,
    history: Vec<ChatMessage>,
    in_flight: Option<InFlight>,
}

async fn next_reply(in_flight: &mut Option<InFlight>) -> Option<Result<TriageReply, Error>> {
    match in_flight {
        Some(pending) => match (&mut pending.handle).await {
            Ok(result) => Some(result),
            Err(error) => {
                warn!(error = %error, "Triage reply task failed");
                Some(Err(Error::internal("reply task failed")))
            }
        },
        None => std::future::pending().await,
    }
}

impl WsSession {
    fn new(triage: TriageService, clock: Arc<dyn Clock>, trial: TrialSession) -> Self {
        Self {
            triage,
            clock,
            trial,
            history: Vec::new(),
            in_flight: None,
        }
    }

    async fn run(mut self, mut session: Session, mut stream: MessageStream) {
        let mut last_heartbeat = Instant::now();
        let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

        loop {
            let result = tokio::select! {
                _ = heartbeat.tick() => {
                    Self::handle_heartbeat_tick(&mut session, &last_heartbeat).await
                }
                message = stream.recv() => {
                    self.handle_stream_message(&mut session, &mut last_heartbeat, message)
                        .await
                }
                Some(reply) = next_reply(&mut self.in_flight), if self.in_flight.is_some() => {
                    self.handle_reply(&mut session, reply).await
                }
            };

            if let Err(error) = result {
                self.abort_in_flight();
                log_shutdown_reason(&error);
                let close_action = close_action_for(&error);
                close_session_if_needed(session, close_action).await;
                return;
            }
        }
    }

    async fn handle_heartbeat_tick(
        session: &mut Session,
        last_heartbeat: &Instant,
    ) -> Result<(), SessionError> {
        if Instant::now().duration_since(*last_heartbeat) > CLIENT_TIMEOUT {
            return Err(SessionError::HeartbeatTimeout);
        }

        session.ping(b"").await.map_err(SessionError::Network)
    }

    async fn handle_stream_message(
        &mut self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Option<Result<Message, ProtocolError>>,
    ) -> Result<(), SessionError> {
        let Some(message) = message else {
            return Err(SessionError::StreamClosed);
        };

        match message {
            Ok(message) => self.handle_message(session, last_heartbeat, message).await,
            Err(error) => Err(SessionError::Protocol(error)),
        }
    }

    async fn handle_message(
        &mut self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Message,
    ) -> Result<(), SessionError> {
        match message {
            Message::Ping(payload) => {
                *last_heartbeat = Instant::now();
                session
                    .pong(&payload)
                    .await
                    .map_err(SessionError::Network)
            }
            Message::Text(text) => {
                *last_heartbeat = Instant::now();
                self.handle_text_message(session, text.as_ref()).await
            }
            Message::Pong(_) | Message::Binary(_) | Message::Continuation(_) | Message::Nop => {
                *last_heartbeat = Instant::now();
                Ok(())
            }
            Message::Close(reason) => Err(SessionError::ClientClosed(reason)),
        }
    }

    async fn handle_text_message(
        &mut self,
        session: &mut Session,
        text: &str,
    ) -> Result<(), SessionError> {
        let frame = match serde_json::from_str::<ClientFrame>(text) {
            Ok(frame) => frame,
            Err(error) => {
                warn!(error = %error, "Rejected malformed WebSocket payload");
                return Err(SessionError::InvalidPayload);
            }
        };

        match frame {
            ClientFrame::Prompt { history, prompt } => {
                self.handle_prompt(session, history, prompt).await
            }
            ClientFrame::Interrupt => {
                if self.abort_in_flight() {
                    debug!("Triage reply interrupted by client");
                }
                send_frame(session, &ServerFrame::Interrupted).await
            }
        }
    }

    async fn handle_prompt(
        &mut self,
        session: &mut Session,
        history: Option<Vec<ChatMessage>>,
        prompt: String,
    ) -> Result<(), SessionError> {
        if self.trial.is_expired(self.clock.utc()) {
            let error = Error::forbidden("trial period has ended");
            send_frame(session, &ServerFrame::from(&error)).await?;
            return Err(SessionError::TrialExpired);
        }
        if self.in_flight.is_some() {
            let error = Error::conflict("a reply is already in progress");
            return send_frame(session, &ServerFrame::from(&error)).await;
        }
        if let Some(history) = history {
            self.history = history;
            cap_history(&mut self.history);
        }

        let triage = self.triage.clone();
        let context = self.history.clone();
        let question = prompt.clone();
        let handle =
            actix_web::rt::spawn(async move { triage.reply(&context, &question).await });
        self.in_flight = Some(InFlight { prompt, handle });
        Ok(())
    }

    async fn handle_reply(
        &mut self,
        session: &mut Session,
        reply: Result<TriageReply, Error>,
    ) -> Result<(), SessionError> {
        let prompt = self.in_flight.take().map(|pending| pending.prompt);
        match reply {
            Ok(reply) => {
                if let Some(prompt) = prompt {
                    self.history.push(ChatMessage::user(prompt.trim()));
                    self.history.push(ChatMessage::model(reply.text.clone()));
                    cap_history(&mut self.history);
                }
                send_frame(session, &ServerFrame::from(reply)).await
            }
            Err(error) => send_frame(session, &ServerFrame::from(&error)).await,
        }
    }

    /// Returns `true` when a reply was actually aborted.
    fn abort_in_flight(&mut self) -> bool {
        match self.in_flight.take() {
            Some(pending) => {
                pending.handle.abort();
                true
            }
            None => false,
        }
    }
}

async fn send_frame(session: &mut Session, frame: &ServerFrame) -> Result<(), SessionError> {
    match serde_json::to_string(frame) {
        Ok(body) => session.text(body).await.map_err(SessionError::Network),
        Err(error) => {
            warn!(error = %error, "Failed to serialize WebSocket payload");
            Ok(())
        }
    }
}

fn log_shutdown_reason(error: &SessionError) {
    match error {
        SessionError::HeartbeatTimeout => {
            warn!("WebSocket heartbeat timeout; closing connection");
        }
        SessionError::Protocol(error) => {
            warn!(error = %error, "WebSocket protocol error");
        }
        SessionError::Network(error) => {
            warn!(error = %error, "WebSocket send failed; closing connection");
        }
        SessionError::TrialExpired => {
            debug!("Trial expired; closing live triage session");
        }
        SessionError::InvalidPayload
        | SessionError::ClientClosed(_)
        | SessionError::StreamClosed => {}
    }
}

fn close_action_for(error: &SessionError) -> CloseAction {
    match error {
        SessionError::HeartbeatTimeout => CloseAction::Close(Some(CloseReason {
            code: CloseCode::Normal,
            description: Some("heartbeat timeout".to_owned()),
        })),
        SessionError::Protocol(_) => CloseAction::Close(Some(CloseReason {
            code: CloseCode::Protocol,
            description: Some("protocol error".to_owned()),
        })),
        SessionError::InvalidPayload => CloseAction::Close(Some(CloseReason {
            code: CloseCode::Policy,
            description: Some("invalid payload".to_owned()),
        })),
        SessionError::TrialExpired => CloseAction::Close(Some(CloseReason {
            code: CloseCode::Policy,
            description: Some("trial expired".to_owned()),
        })),
        SessionError::ClientClosed(reason) => CloseAction::Close(reason.clone()),
        SessionError::StreamClosed | SessionError::Network(_) => CloseAction::None,
    }
}

async fn close_session_if_needed(session: Session, close_action: CloseAction) {
    if let CloseAction::Close(reason) = close_action {
        if let Err(error) = session.close(reason).await {
            warn!(error = %error, "Failed to close WebSocket session");
        }
    }
}

/// Keep only the turns the triage service will read.
fn cap_history(history: &mut Vec<ChatMessage>) {
    let excess = history.len().saturating_sub(MAX_HISTORY_MESSAGES);
    history.drain(..excess);
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
