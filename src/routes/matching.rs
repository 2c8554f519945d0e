use crate::{
    analytics::{Dataset, Demand, Recommendation, Resource, ResourceMatch},
    error::AppError,
    metrics::track_records_processed,
    routes::{ApiJson, ApiResponse},
    server::Server,
};
use axum::{Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    #[serde(default)]
    pub demand: Demand,
    #[serde(default)]
    pub resource: Resource,
}

#[derive(Debug, Serialize)]
pub struct ScoreResult {
    pub score: f64,
}

#[derive(Debug, Deserialize)]
pub struct FindMatchesRequest {
    #[serde(default)]
    pub demand: Demand,
    #[serde(default)]
    pub resources: Vec<Resource>,
    pub limit: Option<usize>,
    pub min_score: Option<f64>,
}

/// Demand/resource matching routes
pub fn create_matching_routes() -> Router<Server> {
    Router::new()
        .route("/score", post(score))
        .route("/find", post(find_matches))
        .route("/recommendations", post(recommendations))
}

async fn score(
    State(server): State<Server>,
    ApiJson(request): ApiJson<ScoreRequest>,
) -> ApiResponse<ScoreResult> {
    ApiResponse::success(ScoreResult {
        score: server
            .matching()
            .calculate_match_score(&request.demand, &request.resource),
    })
}

async fn find_matches(
    State(server): State<Server>,
    ApiJson(request): ApiJson<FindMatchesRequest>,
) -> Result<ApiResponse<Vec<ResourceMatch>>, AppError> {
    let defaults = &server.config.analytics;
    let limit = request.limit.unwrap_or(defaults.default_match_limit);
    let min_score = request.min_score.unwrap_or(defaults.default_min_match_score);

    if !(0.0..=1.0).contains(&min_score) {
        return Err(AppError::BadRequest(format!(
            "min_score must be between 0 and 1, got {}",
            min_score
        )));
    }

    track_records_processed("matching_find", request.resources.len());
    Ok(ApiResponse::success(server.matching().find_matches(
        &request.demand,
        &request.resources,
        limit,
        min_score,
    )))
}

async fn recommendations(
    State(server): State<Server>,
    ApiJson(dataset): ApiJson<Dataset>,
) -> ApiResponse<Vec<Recommendation>> {
    track_records_processed(
        "matching_recommendations",
        dataset.demands.len() + dataset.resources.len(),
    );
    ApiResponse::success(
        server
            .matching()
            .get_recommendations(&dataset.demands, &dataset.resources),
    )
}
