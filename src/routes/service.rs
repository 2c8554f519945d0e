use crate::{analytics::statistics::now, routes::ApiResponse, server::Server};
use axum::{
    Json, Router,
    http::{StatusCode, Uri},
    response::IntoResponse,
    routing::get,
};
use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::{Value, json};

pub const SERVICE_NAME: &str = "MCHIGM Analytics Service";

#[derive(Debug, Serialize)]
pub struct ServiceCheck {
    pub service: &'static str,
    pub timestamp: NaiveDateTime,
}

/// Banner and service check routes
pub fn create_service_routes() -> Router<Server> {
    Router::new()
        .route("/", get(index))
        .route("/api/analytics/test", get(analytics_test))
        .route("/api/automation/test", get(automation_test))
}

async fn index() -> Json<Value> {
    Json(json!({
        "code": 200,
        "message": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

async fn analytics_test() -> ApiResponse<ServiceCheck> {
    ApiResponse::with_message(
        "Analytics service working",
        ServiceCheck {
            service: "analytics",
            timestamp: now(),
        },
    )
}

async fn automation_test() -> ApiResponse<ServiceCheck> {
    ApiResponse::with_message(
        "Automation service working",
        ServiceCheck {
            service: "automation",
            timestamp: now(),
        },
    )
}

/// Fallback for unmatched routes
pub async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "code": 404,
            "message": "Endpoint not found",
            "path": uri.path()
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TestServerBuilder, get_json};

    #[tokio::test]
    async fn test_index_banner() {
        let app = TestServerBuilder::new().build().create_app();

        let (status, body) = get_json(app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], 200);
        assert_eq!(body["message"], SERVICE_NAME);
        assert_eq!(body["status"], "running");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_service_check_endpoints() {
        let server = TestServerBuilder::new().build();

        let (status, body) = get_json(server.create_app(), "/api/analytics/test").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Analytics service working");
        assert_eq!(body["data"]["service"], "analytics");

        let (status, body) = get_json(server.create_app(), "/api/automation/test").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Automation service working");
        assert_eq!(body["data"]["service"], "automation");
    }

    #[tokio::test]
    async fn test_unknown_route_returns_not_found_document() {
        let app = TestServerBuilder::new().build().create_app();

        let (status, body) = get_json(app, "/api/does-not-exist").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 404);
        assert_eq!(body["message"], "Endpoint not found");
        assert_eq!(body["path"], "/api/does-not-exist");
    }
}
