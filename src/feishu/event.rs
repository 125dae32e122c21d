//! Feishu webhook payloads.
//!
//! Every field is optional and read leniently: the platform sends several
//! envelope shapes, and a field of an unexpected JSON type is treated as
//! absent so the event is acknowledged and ignored.

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

pub const URL_VERIFICATION: &str = "url_verification";
pub const EVENT_CALLBACK: &str = "event_callback";
pub const MESSAGE_RECEIVE: &str = "im.message.receive_v1";
pub const SCHEMA_V2: &str = "2.0";

/// Deserialize a field, mapping a value of the wrong type to `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Top-level webhook body.
#[derive(Debug, Default, Deserialize)]
pub struct InboundEvent {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub schema: Option<String>,
    /// Echoed back verbatim, whatever its JSON type.
    #[serde(default)]
    pub challenge: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub header: Option<EventHeader>,
    #[serde(default, deserialize_with = "lenient")]
    pub event: Option<EventBody>,
}

/// Schema 2.0 envelope header.
#[derive(Debug, Default, Deserialize)]
pub struct EventHeader {
    #[serde(default, deserialize_with = "lenient")]
    pub event_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventBody {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub message: Option<MessageBody>,
    #[serde(default, deserialize_with = "lenient")]
    pub sender: Option<Sender>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MessageBody {
    #[serde(default, deserialize_with = "lenient")]
    pub message_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub chat_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub chat_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Sender {
    #[serde(default, deserialize_with = "lenient")]
    pub sender_id: Option<SenderId>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SenderId {
    #[serde(default, deserialize_with = "lenient")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub open_id: Option<String>,
}

/// A text message pulled out of a webhook, ready for routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMessage {
    pub text: String,
    pub receive_id: String,
    pub sender: String,
}

impl InboundEvent {
    pub fn is_url_verification(&self) -> bool {
        self.kind.as_deref() == Some(URL_VERIFICATION)
    }

    /// The event type, from either the legacy `event_callback` body or a 2.0 header.
    pub fn event_type(&self) -> Option<&str> {
        if self.kind.as_deref() == Some(EVENT_CALLBACK) {
            return self.event.as_ref()?.kind.as_deref();
        }
        if self.schema.as_deref() == Some(SCHEMA_V2) {
            return self.header.as_ref()?.event_type.as_deref();
        }
        None
    }

    /// The text message carried by this event, if it is a received text message.
    pub fn text_message(&self) -> Option<TextMessage> {
        if self.event_type() != Some(MESSAGE_RECEIVE) {
            return None;
        }
        let event = self.event.as_ref()?;
        let message = event.message.as_ref()?;
        if message.message_type.as_deref() != Some("text") {
            return None;
        }

        let text = extract_text(message.content.as_deref().unwrap_or("{}"));
        let sender = event
            .sender
            .as_ref()
            .and_then(|s| s.sender_id.as_ref())
            .map(SenderId::preferred)
            .unwrap_or_default();

        let receive_id = if message.chat_type.as_deref() == Some("p2p") {
            sender.clone()
        } else {
            message.chat_id.clone().unwrap_or_default()
        };

        Some(TextMessage {
            text,
            receive_id,
            sender,
        })
    }
}

impl SenderId {
    /// `user_id` when present, otherwise `open_id`.
    fn preferred(&self) -> String {
        [&self.user_id, &self.open_id]
            .into_iter()
            .flatten()
            .find(|id| !id.is_empty())
            .cloned()
            .unwrap_or_default()
    }
}

/// Pull the `text` field out of a message's JSON `content` string.
///
/// Falls back to the raw content when it is not a JSON object or `text` is
/// not a string. A missing `text` field yields an empty string.
pub fn extract_text(content: &str) -> String {
    match serde_json::from_str::<Value>(content) {
        Ok(Value::Object(map)) => match map.get("text") {
            None => String::new(),
            Some(Value::String(text)) => text.trim().to_string(),
            Some(_) => content.to_string(),
        },
        _ => content.to_string(),
    }
}
