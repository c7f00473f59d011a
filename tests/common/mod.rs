//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use pubsub_bridge::config::BridgeConfig;
use pubsub_bridge::lifecycle::serve_until;
use pubsub_bridge::{BridgeError, BridgeServer, MessageId, PublishError, Publisher};

/// A message received by the mock Pub/Sub server.
#[derive(Debug, Clone, PartialEq)]
pub struct Received {
    pub project: String,
    pub topic: String,
    pub data: Vec<u8>,
}

/// How the mock Pub/Sub server answers publish calls.
#[derive(Clone)]
pub enum MockBehavior {
    Accept,
    Reject { status: u16, message: &'static str },
    Delay(Duration),
    /// Accept the message but answer with a blank message ID.
    BlankId,
}

#[derive(Clone)]
struct MockState {
    behavior: MockBehavior,
    received: Arc<Mutex<Vec<Received>>>,
}

/// A running mock of the Pub/Sub REST `publish` method.
pub struct MockPubSub {
    pub addr: SocketAddr,
    pub received: Arc<Mutex<Vec<Received>>>,
}

/// Start a mock Pub/Sub emulator on an ephemeral port.
pub async fn start_mock_pubsub(behavior: MockBehavior) -> MockPubSub {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let received = Arc::new(Mutex::new(Vec::new()));

    let state = MockState {
        behavior,
        received: received.clone(),
    };
    let app = Router::new()
        .route("/v1/projects/{project}/topics/{topic}", post(mock_publish))
        .with_state(state);

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockPubSub { addr, received }
}

async fn mock_publish(
    State(state): State<MockState>,
    Path((project, topic)): Path<(String, String)>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let Some(topic) = topic.strip_suffix(":publish") else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let data = body["messages"][0]["data"].as_str().unwrap_or_default();
    let data = STANDARD.decode(data).unwrap();

    match state.behavior {
        MockBehavior::Reject { status, message } => {
            let body = serde_json::json!({
                "error": { "code": status, "message": message, "status": "RESOURCE_EXHAUSTED" }
            });
            return (StatusCode::from_u16(status).unwrap(), Json(body)).into_response();
        }
        MockBehavior::Delay(delay) => tokio::time::sleep(delay).await,
        MockBehavior::BlankId => {
            return Json(serde_json::json!({ "messageIds": [""] })).into_response();
        }
        MockBehavior::Accept => {}
    }

    state.received.lock().unwrap().push(Received {
        project,
        topic: topic.to_string(),
        data,
    });

    let id = uuid::Uuid::new_v4().to_string();
    Json(serde_json::json!({ "messageIds": [id] })).into_response()
}

/// In-process publisher for tests that do not need HTTP to the broker.
#[derive(Default)]
pub struct MockPublisher {
    pub calls: Mutex<Vec<(String, Vec<u8>)>>,
    pub fail_with: Option<&'static str>,
    pub delay: Option<Duration>,
}

#[async_trait]
impl Publisher for MockPublisher {
    async fn publish(&self, topic: &str, data: &[u8]) -> Result<MessageId, PublishError> {
        self.calls
            .lock()
            .unwrap()
            .push((topic.to_string(), data.to_vec()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.fail_with {
            Some(message) => Err(PublishError::Rejected {
                status: 429,
                message: message.to_string(),
            }),
            None => Ok(MessageId(format!("mock-{}", uuid::Uuid::new_v4()))),
        }
    }
}

/// Configuration matching the `p1` / `/c` / `t1` deployment.
pub fn bridge_config(emulator: Option<SocketAddr>) -> BridgeConfig {
    let mut config = BridgeConfig::default();
    config.pubsub.project_id = "p1".into();
    config.pubsub.credentials = "/c".into();
    config.pubsub.topic = "t1".into();
    config.pubsub.emulator_host = emulator.map(|a| a.to_string());
    config.listener.bind_address = "127.0.0.1:0".into();
    config.lifecycle.shutdown_timeout_secs = 5;
    config
}

/// A bridge serving on an ephemeral port.
pub struct RunningBridge {
    pub addr: SocketAddr,
    pub stop: oneshot::Sender<()>,
    pub task: JoinHandle<Result<(), BridgeError>>,
}

impl RunningBridge {
    pub fn url(&self) -> String {
        format!("http://{}/pubsub", self.addr)
    }
}

/// Start a bridge that shuts down when `stop` is sent.
pub async fn start_bridge(config: BridgeConfig, publisher: Arc<dyn Publisher>) -> RunningBridge {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stop_rx) = oneshot::channel::<()>();

    let server = BridgeServer::new(&config, publisher);
    let timeout = config.lifecycle.shutdown_timeout();
    let task = tokio::spawn(serve_until(server, listener, timeout, async move {
        let _ = stop_rx.await;
    }));

    RunningBridge { addr, stop, task }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Records span opens/closes by name and every event's fields.
#[derive(Clone, Default)]
pub struct Capture {
    inner: Arc<Mutex<CaptureState>>,
}

#[derive(Default)]
struct CaptureState {
    opened: HashMap<&'static str, usize>,
    closed: HashMap<&'static str, usize>,
    events: Vec<String>,
}

impl Capture {
    pub fn opened(&self, name: &str) -> usize {
        self.inner.lock().unwrap().opened.get(name).copied().unwrap_or(0)
    }

    pub fn closed(&self, name: &str) -> usize {
        self.inner.lock().unwrap().closed.get(name).copied().unwrap_or(0)
    }

    /// Events whose rendered fields contain `needle`.
    pub fn events_containing(&self, needle: &str) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .events
            .iter()
            .filter(|e| e.contains(needle))
            .cloned()
            .collect()
    }
}

impl<S> Layer<S> for Capture
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
        let mut state = self.inner.lock().unwrap();
        *state.opened.entry(attrs.metadata().name()).or_default() += 1;
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(&id) {
            let mut state = self.inner.lock().unwrap();
            *state.closed.entry(span.name()).or_default() += 1;
        }
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldRecorder(String::new());
        event.record(&mut visitor);
        self.inner.lock().unwrap().events.push(visitor.0);
    }
}

struct FieldRecorder(String);

impl Visit for FieldRecorder {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if !self.0.is_empty() {
            self.0.push(' ');
        }
        if field.name() == "message" {
            self.0.push_str(&format!("{:?}", value));
        } else {
            self.0.push_str(&format!("{}={:?}", field.name(), value));
        }
    }
}
