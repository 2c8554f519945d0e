use crate::{
    analytics::{
        Dataset, Item,
        statistics::{DemandStats, PlatformOverview, ResourceStats, TagCount, Trends, UserStats},
    },
    error::AppError,
    metrics::track_records_processed,
    routes::{ApiJson, ApiResponse},
    server::Server,
};
use axum::{Router, extract::State, routing::post};
use serde::Deserialize;

/// Body of a trends request
#[derive(Debug, Deserialize)]
pub struct TrendsRequest {
    #[serde(default)]
    pub items: Vec<Item>,
    pub days: Option<u32>,
}

/// Body of a top tags request
#[derive(Debug, Deserialize)]
pub struct TopTagsRequest {
    #[serde(default)]
    pub items: Vec<Item>,
    pub limit: Option<usize>,
}

/// Statistics endpoints; every route takes its records in the request body
pub fn create_analytics_routes() -> Router<Server> {
    Router::new()
        .route("/overview", post(platform_overview))
        .route("/demands", post(demand_stats))
        .route("/resources", post(resource_stats))
        .route("/users", post(user_stats))
        .route("/trends", post(trends))
        .route("/top-tags", post(top_tags))
}

async fn platform_overview(
    State(server): State<Server>,
    ApiJson(dataset): ApiJson<Dataset>,
) -> ApiResponse<PlatformOverview> {
    track_records_processed(
        "overview",
        dataset.demands.len() + dataset.resources.len() + dataset.users.len(),
    );
    ApiResponse::success(server.statistics().calculate_platform_overview(
        &dataset.demands,
        &dataset.resources,
        &dataset.users,
    ))
}

async fn demand_stats(
    State(server): State<Server>,
    ApiJson(dataset): ApiJson<Dataset>,
) -> ApiResponse<DemandStats> {
    track_records_processed("demands", dataset.demands.len());
    ApiResponse::success(server.statistics().calculate_demand_stats(&dataset.demands))
}

async fn resource_stats(
    State(server): State<Server>,
    ApiJson(dataset): ApiJson<Dataset>,
) -> ApiResponse<ResourceStats> {
    track_records_processed("resources", dataset.resources.len());
    ApiResponse::success(server.statistics().calculate_resource_stats(&dataset.resources))
}

async fn user_stats(
    State(server): State<Server>,
    ApiJson(dataset): ApiJson<Dataset>,
) -> ApiResponse<UserStats> {
    track_records_processed("users", dataset.users.len());
    ApiResponse::success(server.statistics().calculate_user_stats(&dataset.users))
}

async fn trends(
    State(server): State<Server>,
    ApiJson(request): ApiJson<TrendsRequest>,
) -> Result<ApiResponse<Trends>, AppError> {
    let limits = &server.config.analytics;
    let days = request.days.unwrap_or(limits.default_trend_days);
    if days > limits.max_trend_days {
        return Err(AppError::BadRequest(format!(
            "days must not exceed {}",
            limits.max_trend_days
        )));
    }

    track_records_processed("trends", request.items.len());
    Ok(ApiResponse::success(
        server.statistics().get_trends(&request.items, days),
    ))
}

async fn top_tags(
    State(server): State<Server>,
    ApiJson(request): ApiJson<TopTagsRequest>,
) -> ApiResponse<Vec<TagCount>> {
    let limit = request
        .limit
        .unwrap_or(server.config.analytics.default_tag_limit);

    track_records_processed("top_tags", request.items.len());
    ApiResponse::success(server.statistics().get_top_tags(&request.items, limit))
}
