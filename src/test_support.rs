//! In-process stand-in for the recommendation service.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::Notify;

#[derive(Debug, Clone)]
pub struct ReceivedRequest {
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct MockReply {
    status: u16,
    body: String,
}

impl MockReply {
    pub fn json(value: serde_json::Value) -> Self {
        Self {
            status: 200,
            body: value.to_string(),
        }
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

#[derive(Clone)]
struct MockState {
    reply: MockReply,
    gate: Option<Arc<Notify>>,
    received: Arc<Mutex<Vec<ReceivedRequest>>>,
}

pub struct MockService {
    address: SocketAddr,
    gate: Option<Arc<Notify>>,
    received: Arc<Mutex<Vec<ReceivedRequest>>>,
    handle: tokio::task::JoinHandle<()>,
}

impl MockService {
    pub async fn spawn(reply: MockReply) -> Self {
        Self::start(reply, None).await
    }

    /// Like `spawn`, but every response is held until `release` is called
    pub async fn spawn_gated(reply: MockReply) -> Self {
        Self::start(reply, Some(Arc::new(Notify::new()))).await
    }

    async fn start(reply: MockReply, gate: Option<Arc<Notify>>) -> Self {
        let received = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            reply,
            gate: gate.clone(),
            received: received.clone(),
        };
        let app = Router::new()
            .route("/query", post(query))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock listener");
        let address = listener.local_addr().expect("mock listener local addr");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("run mock server");
        });

        Self {
            address,
            gate,
            received,
            handle,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}/query", self.address)
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn received(&self) -> Vec<ReceivedRequest> {
        self.received.lock().expect("received lock").clone()
    }
}

impl Drop for MockService {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn query(
    State(state): State<MockState>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    state.received.lock().expect("received lock").push(ReceivedRequest {
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });

    if let Some(gate) = &state.gate {
        gate.notified().await;
    }

    (
        StatusCode::from_u16(state.reply.status).expect("valid status"),
        [(header::CONTENT_TYPE, "application/json")],
        state.reply.body.clone(),
    )
}

/// An endpoint nothing is listening on
pub async fn unused_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind throwaway listener");
    let address = listener.local_addr().expect("throwaway local addr");
    drop(listener);
    format!("http://{}/query", address)
}
