//! Feishu message API client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use super::token::{AuthError, TokenCache};

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum SendError {
    #[error("no access token: {0}")]
    Auth(#[from] AuthError),

    #[error("send request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("send response could not be decoded: {0}")]
    Decode(String),
}

/// How Feishu should interpret a `receive_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveIdType {
    OpenId,
    UnionId,
    ChatId,
    UserId,
}

impl ReceiveIdType {
    /// Infer the id type from its prefix (`ou_`, `on_`, `oc_`), defaulting to `user_id`.
    pub fn from_receive_id(receive_id: &str) -> Self {
        if receive_id.starts_with("ou_") {
            ReceiveIdType::OpenId
        } else if receive_id.starts_with("on_") {
            ReceiveIdType::UnionId
        } else if receive_id.starts_with("oc_") {
            ReceiveIdType::ChatId
        } else {
            ReceiveIdType::UserId
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReceiveIdType::OpenId => "open_id",
            ReceiveIdType::UnionId => "union_id",
            ReceiveIdType::ChatId => "chat_id",
            ReceiveIdType::UserId => "user_id",
        }
    }
}

impl fmt::Display for ReceiveIdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `code` field Feishu uses to report success (0) or failure.
pub fn provider_code(response: &Value) -> Option<i64> {
    response.get("code").and_then(Value::as_i64)
}

/// Anything that can deliver a text reply to a Feishu conversation.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Send `text` to `receive_id`, returning the provider's raw response.
    async fn send_text(&self, receive_id: &str, text: &str) -> Result<Value, SendError>;
}

#[derive(Serialize)]
struct SendRequest<'a> {
    receive_id: &'a str,
    msg_type: &'static str,
    content: String,
}

/// Sends messages through the Feishu open API, authorizing with a cached tenant token.
pub struct FeishuClient {
    client: Client,
    url: String,
    tokens: TokenCache,
}

impl FeishuClient {
    pub fn new(client: Client, base_url: &str, tokens: TokenCache) -> Self {
        Self {
            client,
            url: format!("{}/im/v1/messages", base_url.trim_end_matches('/')),
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenCache {
        &self.tokens
    }
}

#[async_trait]
impl MessageSender for FeishuClient {
    async fn send_text(&self, receive_id: &str, text: &str) -> Result<Value, SendError> {
        let token = self.tokens.get_token().await?;
        let receive_id_type = ReceiveIdType::from_receive_id(receive_id);
        tracing::debug!("Sending text to {} ({})", receive_id, receive_id_type);

        let request = SendRequest {
            receive_id,
            msg_type: "text",
            content: serde_json::json!({ "text": text }).to_string(),
        };

        let response = self
            .client
            .post(&self.url)
            .timeout(SEND_TIMEOUT)
            .bearer_auth(&token)
            .query(&[("receive_id_type", receive_id_type.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send Feishu message to {}: {}", receive_id, e);
                SendError::Request(e)
            })?;

        response
            .json::<Value>()
            .await
            .map_err(|e| SendError::Decode(e.to_string()))
    }
}
