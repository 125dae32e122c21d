//! Feishu event subscription callback.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::feishu::handler::preview;
use crate::feishu::InboundEvent;
use crate::web::router::AppState;

#[derive(Serialize)]
struct ErrorReply {
    code: u16,
    msg: String,
}

/// HTTP 500 with `{code: 500, msg: "server error: ..."}`.
pub fn server_error(detail: impl std::fmt::Display) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorReply {
            code: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            msg: format!("server error: {}", detail),
        }),
    )
        .into_response()
}

/// `POST /webhook`
pub async fn webhook(State(state): State<AppState>, body: Bytes) -> Response {
    tracing::info!(
        "Received Feishu event: {}",
        preview(&String::from_utf8_lossy(&body), 200)
    );

    let event = match parse_event(&body) {
        Ok(event) => event,
        Err(e) => {
            tracing::error!("Could not parse webhook body: {}", e);
            return server_error(e);
        }
    };

    Json(state.events.handle(event).await).into_response()
}

/// Only a body that is not a JSON object fails; field types are checked leniently.
fn parse_event(body: &[u8]) -> Result<InboundEvent, String> {
    match serde_json::from_slice::<Value>(body).map_err(|e| e.to_string())? {
        value @ Value::Object(_) => serde_json::from_value(value).map_err(|e| e.to_string()),
        _ => Err("expected a JSON object".to_string()),
    }
}
