//! Feishu relay library root.

pub mod cli;
pub mod config;
pub mod error;
pub mod feishu;
pub mod logging;
pub mod providers;
pub mod web;

#[cfg(test)]
mod testing;

pub use cli::Commands;
pub use config::{load_settings, LoadedSettings, Settings};
pub use error::{Error, Result};
pub use feishu::{EventRouter, FeishuClient, InboundEvent, TokenCache, WebhookReply};
pub use providers::Provider;
pub use web::{create_app_router, run_web_server, AppState};
