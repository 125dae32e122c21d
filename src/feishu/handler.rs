//! Webhook event routing.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use super::client::{provider_code, MessageSender};
use super::commands::Command;
use super::event::InboundEvent;
use crate::providers::Provider;

/// Body returned to Feishu for a webhook call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum WebhookReply {
    /// Echo of the URL verification handshake.
    Challenge { challenge: Value },
    /// Acknowledgment; `code` is always 0 for handled events.
    Ack { code: i32, msg: &'static str },
}

impl WebhookReply {
    fn ack(msg: &'static str) -> Self {
        WebhookReply::Ack { code: 0, msg }
    }
}

/// Routes one inbound webhook event to a built-in command or the completion provider.
pub struct EventRouter {
    sender: Arc<dyn MessageSender>,
    provider: Arc<dyn Provider>,
}

impl EventRouter {
    pub fn new(sender: Arc<dyn MessageSender>, provider: Arc<dyn Provider>) -> Self {
        Self { sender, provider }
    }

    pub async fn handle(&self, event: InboundEvent) -> WebhookReply {
        if event.is_url_verification() {
            let challenge = event
                .challenge
                .unwrap_or_else(|| Value::String(String::new()));
            tracing::info!("URL verification request, challenge: {}", challenge);
            return WebhookReply::Challenge { challenge };
        }

        let Some(message) = event.text_message() else {
            return WebhookReply::ack("event received");
        };

        if let Some(command) = Command::parse(&message.text) {
            tracing::info!("Command {:?} from {}", command, message.sender);
            self.reply(&message.receive_id, command.reply()).await;
            return WebhookReply::ack(command.ack());
        }

        if message.text.trim().is_empty() {
            return WebhookReply::ack("event received");
        }

        tracing::info!(
            "Handling message from {}: {}...",
            message.sender,
            preview(&message.text, 50)
        );
        let answer = self.provider.complete(&message.text).await;
        self.reply(&message.receive_id, &answer).await;

        WebhookReply::ack("message processed")
    }

    /// Send a reply, logging the outcome. Failures never reach the webhook caller.
    async fn reply(&self, receive_id: &str, text: &str) {
        match self.sender.send_text(receive_id, text).await {
            Ok(response) if provider_code(&response) == Some(0) => {
                tracing::info!("Reply delivered to {}", receive_id);
            }
            Ok(response) => {
                tracing::warn!("Feishu refused reply to {}: {}", receive_id, response);
            }
            Err(e) => {
                tracing::error!("Reply to {} not sent: {}", receive_id, e);
            }
        }
    }
}

/// First `max_chars` characters of `text`, for log lines.
pub fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
