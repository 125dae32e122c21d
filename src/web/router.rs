//! Route definitions for the relay's HTTP server.

use axum::{
    response::Response,
    routing::{get, post},
    Router,
};
use reqwest::Client;
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as CorsAny, CorsLayer};
use tower_http::trace::TraceLayer;

use super::api;
use crate::config::Settings;
use crate::error::Result;
use crate::feishu::{EventRouter, FeishuClient, TokenCache};
use crate::providers::create_provider;

/// State shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub events: Arc<EventRouter>,
}

impl AppState {
    pub fn new(events: EventRouter) -> Self {
        Self {
            events: Arc::new(events),
        }
    }

    /// Wire the Feishu client, token cache and completion provider from settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("feishu-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let tokens = TokenCache::new(
            client.clone(),
            &settings.feishu.base_url,
            settings.feishu.app_id.clone(),
            settings.feishu.app_secret.clone(),
        );
        let feishu = FeishuClient::new(client.clone(), &settings.feishu.base_url, tokens);
        let provider = create_provider(client, &settings.deepseek);
        if provider.is_configured() {
            tracing::info!("Completion provider: {}", provider.name());
        } else {
            tracing::warn!("Completion provider {} is not configured", provider.name());
        }

        Ok(Self::new(EventRouter::new(Arc::new(feishu), provider)))
    }
}

/// Create the full app router.
pub fn create_app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::home))
        .route("/health", get(api::health_check))
        .route("/webhook", post(api::webhook))
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(CorsAny)
                .allow_methods(CorsAny)
                .allow_headers(CorsAny),
        )
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    tracing::error!("Request handler panicked: {}", detail);
    api::server_error(detail)
}
