//! Feishu (Lark) integration: token cache, message client, webhook routing.

pub mod client;
pub mod commands;
pub mod event;
pub mod handler;
pub mod token;

pub use client::{provider_code, FeishuClient, MessageSender, ReceiveIdType, SendError};
pub use commands::Command;
pub use event::InboundEvent;
pub use handler::{EventRouter, WebhookReply};
pub use token::{AuthError, TokenCache};
