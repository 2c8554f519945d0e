pub mod config;
pub mod middleware;

use crate::{
    analytics::{MatchingService, ReportGenerator, StatisticsService},
    config::Config,
    error::AppError,
    metrics,
    routes::{
        create_analytics_routes, create_health_routes, create_matching_routes,
        create_report_routes, create_service_routes, not_found,
    },
    server::middleware::{request_id_middleware, request_response_logger},
    shutdown::ShutdownCoordinator,
};
use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, StatusCode},
    middleware as axum_middleware,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::{any::Any, sync::Arc};
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any as CorsAny, CorsLayer},
};
use tracing::{error, info, warn};

/// Maximum request body size (10MB); datasets arrive in the request body
const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct Server {
    pub config: Arc<Config>,
    pub shutdown_coordinator: Arc<ShutdownCoordinator>,
    reports: Arc<ReportGenerator>,
    matching: MatchingService,
}

impl Server {
    pub fn new(config: Config) -> Self {
        let statistics = StatisticsService::new();
        Self {
            config: Arc::new(config),
            shutdown_coordinator: Arc::new(ShutdownCoordinator::new()),
            reports: Arc::new(ReportGenerator::new(statistics)),
            matching: MatchingService::new(),
        }
    }

    pub fn statistics(&self) -> &StatisticsService {
        self.reports.statistics()
    }

    pub fn reports(&self) -> Arc<ReportGenerator> {
        self.reports.clone()
    }

    pub fn matching(&self) -> &MatchingService {
        &self.matching
    }

    pub async fn run(&self) -> Result<(), AppError> {
        let _metrics_handle = if self.config.metrics.enabled {
            let handle = metrics::init_metrics_with_port(self.config.metrics.port).map_err(|e| {
                AppError::Internal(format!("Failed to start metrics server: {}", e))
            })?;
            Some(handle)
        } else {
            None
        };

        let app = self.create_app();

        let addr = format!("{}:{}", self.config.server.host, self.config.server.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

        info!("Server listening on http://{}", addr);

        let shutdown_coordinator = self.shutdown_coordinator.clone();
        tokio::spawn(async move {
            shutdown_coordinator.wait_for_shutdown_signal().await;
        });

        let mut shutdown_rx = self.shutdown_coordinator.subscribe();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.changed().await;
                info!("Graceful shutdown initiated");
            })
            .await
            .map_err(|e| AppError::Internal(format!("Server error: {}", e)))?;

        info!("Server shutdown complete");
        Ok(())
    }

    // Creates an application router
    pub fn create_app(&self) -> Router {
        let mut app = Router::new()
            .merge(create_service_routes())
            .nest("/api/health", create_health_routes())
            .nest("/api/analytics", create_analytics_routes())
            .nest("/api/reports", create_report_routes())
            .nest("/api/matching", create_matching_routes())
            .fallback(not_found)
            .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
            .with_state(self.clone());

        app = self.add_conditional_middleware(app);
        app.layer(axum_middleware::from_fn(request_id_middleware))
            .layer(self.cors_layer())
            .layer(CatchPanicLayer::custom(handle_panic))
    }

    /// Helper method for adding conditional middleware
    fn add_conditional_middleware(&self, mut app: Router) -> Router {
        if self.config.metrics.enabled {
            app = app.layer(axum_middleware::from_fn(metrics::metrics_middleware));
        }
        if self.config.logging.log_request {
            app = app.layer(axum_middleware::from_fn(request_response_logger));
        }
        app
    }

    /// Any origin when none are configured, otherwise only the listed ones
    fn cors_layer(&self) -> CorsLayer {
        let configured = &self.config.cors.allowed_origins;
        let layer = CorsLayer::new()
            .allow_methods(CorsAny)
            .allow_headers(CorsAny);

        if configured.is_empty() {
            return layer.allow_origin(CorsAny);
        }

        let origins: Vec<HeaderValue> = configured
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();

        layer.allow_origin(AllowOrigin::list(origins))
    }
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    };

    error!(error = %detail, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "code": 500,
            "message": "Internal server error",
            "error": detail
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestServerBuilder;
    use axum::{
        body::Body,
        http::{Request, header},
        routing::get,
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_server_creation() {
        let server = TestServerBuilder::new().build();
        assert_eq!(server.config.server.port, 8001);
        assert_eq!(server.statistics().calculate_demand_stats(&[]).total, 0);
    }

    #[tokio::test]
    async fn test_permissive_cors_by_default() {
        let app = TestServerBuilder::new().build().create_app();

        let request = Request::builder()
            .uri("/api/health")
            .header(header::ORIGIN, "http://example.com")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_cors_restricted_to_configured_origins() {
        let mut config = Config::default();
        config.cors.allowed_origins = vec!["http://allowed.test".to_string()];
        let app = TestServerBuilder::new().with_config(config).build().create_app();

        let request = Request::builder()
            .uri("/api/health")
            .header(header::ORIGIN, "http://allowed.test")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://allowed.test"
        );

        let request = Request::builder()
            .uri("/api/health")
            .header(header::ORIGIN, "http://other.test")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[tokio::test]
    async fn test_panic_renders_internal_error_document() {
        async fn boom() -> &'static str {
            panic!("boom")
        }

        let app = Router::new()
            .route("/boom", get(boom))
            .layer(CatchPanicLayer::custom(handle_panic));

        let request = Request::builder().uri("/boom").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], 500);
        assert_eq!(body["message"], "Internal server error");
        assert_eq!(body["error"], "boom");
    }
}
