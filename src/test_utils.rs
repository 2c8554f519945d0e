use crate::{config::Config, server::Server};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Test server builder with metrics and request logging disabled
pub struct TestServerBuilder {
    config: Config,
}

impl TestServerBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Set a custom configuration
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Write exported reports into `dir`
    pub fn with_export_dir(mut self, dir: &str) -> Self {
        self.config.analytics.export_dir = dir.to_string();
        self
    }

    pub fn build(self) -> Server {
        let mut config = self.config;
        config.metrics.enabled = false;
        config.logging.log_request = false;
        Server::new(config)
    }
}

impl Default for TestServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// Four demands (one completed over ten days), three resources, three users
pub fn sample_dataset() -> Value {
    json!({
        "demands": [
            {"status": "open", "category": "tech", "tags": ["rust", "web"], "created_at": "2024-05-01"},
            {"status": "open", "category": "tech", "tags": ["ai"]},
            {"status": "in_progress", "category": "design", "tags": ["ui"]},
            {
                "status": "completed",
                "category": "tech",
                "tags": ["cloud"],
                "created_at": "2024-01-01T09:00:00Z",
                "updated_at": "2024-01-11T09:00:00Z"
            }
        ],
        "resources": [
            {"type": "expertise", "status": "available", "tags": ["rust", "cloud"]},
            {"type": "funding", "status": "reserved", "tags": ["ai"]},
            {"type": "venue", "status": "available", "tags": []}
        ],
        "users": [
            {"type": "startup", "verified": true, "stats": {"demands_posted": 2, "resources_provided": 0, "collaborations": 1}},
            {"type": "organization", "verified": true, "stats": {"demands_posted": 1, "resources_provided": 2, "collaborations": 3}},
            {"type": "individual", "verified": false, "stats": {"demands_posted": 1, "resources_provided": 1, "collaborations": 2}}
        ]
    })
}
