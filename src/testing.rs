//! Local stand-ins for the Feishu and DeepSeek HTTP APIs used by unit tests.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Serve `router` on an ephemeral localhost port and return its base URL.
pub async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub local_addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{}", addr)
}

/// A message captured by [`StubFeishu`].
#[derive(Clone, Debug)]
pub struct SentMessage {
    pub receive_id_type: String,
    pub authorization: String,
    pub body: Value,
}

#[derive(Default)]
struct StubState {
    reject_auth: bool,
    auth_calls: AtomicUsize,
    sent: Mutex<Vec<SentMessage>>,
}

/// Fake Feishu open API: token endpoint plus message send endpoint.
#[derive(Clone, Default)]
pub struct StubFeishu {
    state: Arc<StubState>,
}

impl StubFeishu {
    /// A stub whose token endpoint always answers with a non-zero code.
    pub fn rejecting() -> Self {
        Self {
            state: Arc::new(StubState {
                reject_auth: true,
                ..StubState::default()
            }),
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/auth/v3/tenant_access_token/internal", post(stub_token))
            .route("/im/v1/messages", post(stub_send))
            .with_state(self.clone())
    }

    pub fn auth_calls(&self) -> usize {
        self.state.auth_calls.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.state.sent.lock().expect("stub lock").clone()
    }
}

async fn stub_token(State(stub): State<StubFeishu>, Json(body): Json<Value>) -> Json<Value> {
    let call = stub.state.auth_calls.fetch_add(1, Ordering::SeqCst) + 1;
    if stub.state.reject_auth || body["app_id"].as_str().unwrap_or("").is_empty() {
        return Json(json!({"code": 10003, "msg": "invalid param"}));
    }
    Json(json!({
        "code": 0,
        "msg": "ok",
        "tenant_access_token": format!("t-{}", call),
        "expire": 7200
    }))
}

async fn stub_send(
    State(stub): State<StubFeishu>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    stub.state.sent.lock().expect("stub lock").push(SentMessage {
        receive_id_type: query.get("receive_id_type").cloned().unwrap_or_default(),
        authorization,
        body,
    });
    Json(json!({"code": 0, "msg": "success", "data": {"message_id": "om_stub"}}))
}
