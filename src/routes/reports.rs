use crate::{
    analytics::{Dataset, Report, ReportKind},
    error::AppError,
    metrics::track_report_export,
    routes::{ApiJson, ApiResponse},
    server::Server,
};
use axum::{
    Router,
    extract::{Path, State},
    routing::post,
};
use serde::{Deserialize, Serialize};
use std::path::{Path as FsPath, PathBuf};
use tracing::warn;

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    #[serde(flatten)]
    pub dataset: Dataset,
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    #[serde(flatten)]
    pub dataset: Dataset,
    pub title: Option<String>,
    pub filename: String,
}

#[derive(Debug, Serialize)]
pub struct ExportResult {
    pub kind: ReportKind,
    pub path: String,
    pub exported: bool,
}

/// Report generation and export routes
pub fn create_report_routes() -> Router<Server> {
    Router::new()
        .route("/{kind}", post(generate_report))
        .route("/{kind}/export", post(export_report))
}

fn parse_kind(kind: &str) -> Result<ReportKind, AppError> {
    kind.parse().map_err(AppError::BadRequest)
}

/// Resolve `filename` inside the export directory, refusing anything but a plain file name
fn export_path(export_dir: &str, filename: &str) -> Result<PathBuf, AppError> {
    let is_plain_name = !filename.contains(['/', '\\'])
        && FsPath::new(filename)
            .file_name()
            .is_some_and(|name| name == filename);

    if !is_plain_name {
        return Err(AppError::BadRequest(format!(
            "Invalid export filename: {:?}",
            filename
        )));
    }

    Ok(FsPath::new(export_dir).join(filename))
}

async fn generate_report(
    State(server): State<Server>,
    Path(kind): Path<String>,
    ApiJson(request): ApiJson<ReportRequest>,
) -> Result<ApiResponse<Report>, AppError> {
    let kind = parse_kind(&kind)?;
    let report = server
        .reports()
        .generate(kind, &request.dataset, request.title.as_deref());

    Ok(ApiResponse::success(report))
}

async fn export_report(
    State(server): State<Server>,
    Path(kind): Path<String>,
    ApiJson(request): ApiJson<ExportRequest>,
) -> Result<ApiResponse<ExportResult>, AppError> {
    let kind = parse_kind(&kind)?;
    let export_dir = server.config.analytics.export_dir.clone();
    let path = export_path(&export_dir, &request.filename)?;

    let generator = server.reports();
    let report = generator.generate(kind, &request.dataset, request.title.as_deref());

    let target = path.clone();
    let exported = tokio::task::spawn_blocking(move || {
        if let Err(e) = std::fs::create_dir_all(&export_dir) {
            warn!(dir = %export_dir, error = %e, "Failed to create export directory");
        }
        generator.export_to_json(&report, &target)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Export task failed: {}", e)))?;

    track_report_export(kind.as_str(), exported);

    if !exported {
        return Err(AppError::Internal(format!(
            "Failed to export report to {}",
            path.display()
        )));
    }

    Ok(ApiResponse::with_message(
        "Report exported",
        ExportResult {
            kind,
            path: path.display().to_string(),
            exported,
        },
    ))
}
