//! Service descriptor and health endpoints.

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct ServiceInfo {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub endpoints: Endpoints,
}

#[derive(Serialize)]
pub struct Endpoints {
    pub home: &'static str,
    pub webhook: &'static str,
    pub health: &'static str,
}

#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
    pub timestamp: String,
}

/// `GET /`
pub async fn home() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        status: "running",
        service: "Feishu AI Chat Bot",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: Endpoints {
            home: "/",
            webhook: "/webhook (POST)",
            health: "/health",
        },
    })
}

/// `GET /health`
pub async fn health_check() -> Json<Health> {
    Json(Health {
        status: "healthy",
        timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    })
}
