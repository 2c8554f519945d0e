use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::Next,
    response::Response,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::time::Instant;
use tracing::info;

/// Install the Prometheus recorder and serve `/metrics` on `port`
pub fn init_metrics_with_port(port: u16) -> Result<PrometheusHandle, BuildError> {
    let builder = PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .add_global_label("service", "mchigm_analytics");

    let handle = builder.install_recorder()?;

    info!("Metrics server started on :{}/metrics", port);
    Ok(handle)
}

/// Middleware to collect HTTP request metrics
pub async fn metrics_middleware(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    gauge!("http_requests_active").increment(1.0);

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status();

    let labels = [
        ("method", method),
        ("path", path),
        ("status", status.as_str().to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    gauge!("http_requests_active").decrement(1.0);

    if status.is_server_error() {
        counter!("http_errors_total", &labels[..2]).increment(1);
    }

    response
}

/// Track generated reports by kind
pub fn track_report_generated(kind: &'static str) {
    counter!("reports_generated_total", "kind" => kind).increment(1);
}

/// Track report exports
pub fn track_report_export(kind: &'static str, success: bool) {
    let result = if success { "success" } else { "failure" };
    counter!("report_exports_total", "kind" => kind, "result" => result).increment(1);
}

/// Track the number of records submitted to an analytics endpoint
pub fn track_records_processed(endpoint: &'static str, records: usize) {
    histogram!("analytics_records_per_request", "endpoint" => endpoint).record(records as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_report_generated() {
        track_report_generated("summary");
        track_report_generated("matching");
        // No panics without an installed recorder
    }

    #[test]
    fn test_track_report_export() {
        track_report_export("category", true);
        track_report_export("category", false);
    }

    #[test]
    fn test_track_records_processed() {
        track_records_processed("overview", 0);
        track_records_processed("trends", 1_000);
    }
}
