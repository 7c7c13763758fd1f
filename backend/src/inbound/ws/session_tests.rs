//! Live triage session tests against a real listener.

use super::*;
use crate::domain::ports::{GenerativeModel, GenerationRequest, GenerativeModelError, MockGenerativeModel};
use crate::inbound::http::test_utils::{TEST_BASE_URL, test_session_middleware};
use crate::inbound::ws;
use crate::inbound::ws::state::{AllowedOrigins, WsState};
use crate::test_support::{MutableClock, fixture_clock};
use actix_web::{App, HttpServer, dev::ServerHandle, http::header, web};
use async_trait::async_trait;
use awc::{BoxedSocket, ws::Codec, ws::Frame, ws::Message as ClientMessage};
use futures_util::{SinkExt, StreamExt};
use rstest::rstest;
use serde_json::{Value, json};
use url::Url;

type Socket = actix_codec::Framed<BoxedSocket, Codec>;

/// Model that never answers within a test's lifetime.
struct StalledModel;

#[async_trait]
impl GenerativeModel for StalledModel {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerativeModelError> {
        time::sleep(Duration::from_secs(60)).await;
        Ok("tarde demais".to_owned())
    }
}

fn answering_model() -> MockGenerativeModel {
    let mut model = MockGenerativeModel::new();
    model
        .expect_generate()
        .returning(|request| Ok(format!("Sobre \"{}\": procure uma consulta online.", request.prompt)));
    model
}

async fn connect(model: Arc<dyn GenerativeModel>, clock: Arc<MutableClock>) -> (Socket, ServerHandle) {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    let base = Url::parse(TEST_BASE_URL).expect("base url");
    let ws_state = WsState::new(
        TriageService::new(model),
        clock,
        AllowedOrigins::from_public_base_url(&base),
    );
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(ws_state.clone()))
            .wrap(test_session_middleware())
            .service(ws::ws_entry)
    })
    .listen(listener)
    .expect("bind test server")
    .disable_signals()
    .run();
    let handle = server.handle();
    actix_web::rt::spawn(server);

    let (_resp, socket) = awc::Client::default()
        .ws(format!("http://{addr}/ws/triage"))
        .set_header(header::ORIGIN, "http://localhost:3000")
        .connect()
        .await
        .expect("websocket connect");
    (socket, handle)
}

async fn send_json(socket: &mut Socket, value: Value) {
    socket
        .send(ClientMessage::Text(value.to_string().into()))
        .await
        .expect("send text");
}

async fn next_frame(socket: &mut Socket) -> Frame {
    loop {
        let frame = socket.next().await.expect("response frame").expect("frame");
        match frame {
            Frame::Ping(_) | Frame::Pong(_) => continue,
            other => return other,
        }
    }
}

async fn next_json(socket: &mut Socket) -> Value {
    match next_frame(socket).await {
        Frame::Text(bytes) => serde_json::from_slice(&bytes).expect("json"),
        other => panic!("expected text frame, got {other:?}"),
    }
}

#[rstest]
#[actix_rt::test]
async fn replies_to_prompts_and_keeps_context() {
    let (mut socket, _server) = connect(Arc::new(answering_model()), fixture_clock()).await;

    send_json(&mut socket, json!({"type": "prompt", "prompt": "Estou com febre"})).await;
    let reply = next_json(&mut socket).await;
    assert_eq!(reply["type"], "reply");
    assert_eq!(reply["fallback"], false);
    assert_eq!(
        reply["text"],
        "Sobre \"Estou com febre\": procure uma consulta online."
    );

    send_json(&mut socket, json!({"type": "prompt", "prompt": "E agora?"})).await;
    let reply = next_json(&mut socket).await;
    assert_eq!(reply["type"], "reply");
}

#[rstest]
#[actix_rt::test]
async fn blank_prompt_yields_error_frame() {
    let (mut socket, _server) = connect(Arc::new(answering_model()), fixture_clock()).await;

    send_json(&mut socket, json!({"type": "prompt", "prompt": "   "})).await;
    let frame = next_json(&mut socket).await;
    assert_eq!(frame["type"], "error");
    assert_eq!(frame["code"], "invalid_request");
}

#[rstest]
#[actix_rt::test]
async fn interrupt_drops_reply_in_flight() {
    let (mut socket, _server) = connect(Arc::new(StalledModel), fixture_clock()).await;

    send_json(&mut socket, json!({"type": "prompt", "prompt": "Estou com febre"})).await;
    send_json(&mut socket, json!({"type": "prompt", "prompt": "Oi?"})).await;
    let busy = next_json(&mut socket).await;
    assert_eq!(busy["code"], "conflict");

    send_json(&mut socket, json!({"type": "interrupt"})).await;
    let frame = next_json(&mut socket).await;
    assert_eq!(frame, json!({"type": "interrupted"}));
}

#[rstest]
#[actix_rt::test]
async fn expired_trial_closes_session() {
    let clock = fixture_clock();
    let (mut socket, _server) = connect(Arc::new(answering_model()), clock.clone()).await;
    clock.advance(Duration::from_secs(301));

    send_json(&mut socket, json!({"type": "prompt", "prompt": "Ainda aí?"})).await;
    let frame = next_json(&mut socket).await;
    assert_eq!(frame["code"], "forbidden");
    match next_frame(&mut socket).await {
        Frame::Close(reason) => {
            let reason = reason.expect("reason");
            assert_eq!(reason.code, CloseCode::Policy);
            assert_eq!(reason.description.as_deref(), Some("trial expired"));
        }
        other => panic!("expected close frame, got {other:?}"),
    }
}

#[rstest]
#[actix_rt::test]
async fn closes_on_malformed_json() {
    let (mut socket, _server) = connect(Arc::new(answering_model()), fixture_clock()).await;
    socket
        .send(ClientMessage::Text("not-json".into()))
        .await
        .expect("send text");

    match next_frame(&mut socket).await {
        Frame::Close(reason) => assert_eq!(reason.expect("reason").code, CloseCode::Policy),
        other => panic!("expected close frame, got {other:?}"),
    }
}

#[rstest]
#[actix_rt::test]
async fn closes_after_timeout_without_client_messages() {
    let (mut socket, _server) = connect(Arc::new(answering_model()), fixture_clock()).await;
    time::sleep(CLIENT_TIMEOUT + HEARTBEAT_INTERVAL * 3).await;

    let observed_close = time::timeout(Duration::from_secs(2), async {
        loop {
            match socket.next().await {
                Some(Ok(Frame::Ping(_) | Frame::Pong(_))) => continue,
                Some(Ok(Frame::Close(reason))) => break reason,
                Some(other) => panic!("unexpected frame before close: {other:?}"),
                None => break None,
            }
        }
    })
    .await
    .expect("close frame missing within timeout")
    .expect("close frame missing after timeout");

    assert_eq!(observed_close.code, CloseCode::Normal);
    assert_eq!(observed_close.description.as_deref(), Some("heartbeat timeout"));
}

#[rstest]
#[case(0, 0)]
#[case(MAX_HISTORY_MESSAGES, MAX_HISTORY_MESSAGES)]
#[case(MAX_HISTORY_MESSAGES + 7, MAX_HISTORY_MESSAGES)]
fn history_keeps_most_recent_turns(#[case] len: usize, #[case] kept: usize) {
    let mut history: Vec<ChatMessage> = (0..len).map(|i| ChatMessage::user(i.to_string())).collect();
    cap_history(&mut history);
    assert_eq!(history.len(), kept);
    if let Some(last) = history.last() {
        assert_eq!(last.text, (len - 1).to_string());
    }
    if let Some(first) = history.first() {
        assert_eq!(first.text, (len - kept).to_string());
    }
}
