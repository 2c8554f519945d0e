use crate::{analytics::statistics::now, routes::ApiResponse, server::Server};
use axum::{Router, routing::get};
use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: NaiveDateTime,
}

/// Create health check routes
pub fn create_health_routes() -> Router<Server> {
    Router::new().route("/", get(health_check))
}

async fn health_check() -> ApiResponse<HealthStatus> {
    ApiResponse::success(HealthStatus {
        status: "healthy",
        timestamp: now(),
    })
}
