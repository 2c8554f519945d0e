//! Demand/resource match scoring and recommendations.
//!
//! A score is a weighted sum in `[0, 1]`:
//!
//! | signal       | weight | value                                            |
//! |--------------|--------|--------------------------------------------------|
//! | tags         | 0.4    | Jaccard similarity of the two tag sets           |
//! | category     | 0.3    | 1.0 if the resource type serves the category, 0.3 if not, 0.0 for unmapped categories |
//! | availability | 0.2    | 1.0 when the resource is available               |
//! | location     | 0.1    | 1.0 for online resources, otherwise 0.5          |

use super::records::{Demand, Resource};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

pub const TAG_WEIGHT: f64 = 0.4;
pub const CATEGORY_WEIGHT: f64 = 0.3;
pub const AVAILABILITY_WEIGHT: f64 = 0.2;
pub const LOCATION_WEIGHT: f64 = 0.1;

pub const DEFAULT_MATCH_LIMIT: usize = 10;
pub const DEFAULT_MIN_SCORE: f64 = 0.3;
pub const RECOMMENDATIONS_PER_DEMAND: usize = 3;

/// Resource types that serve each demand category
const CATEGORY_RESOURCE_TYPES: [(&str, &[&str]); 5] = [
    ("志愿服务", &["服务", "场地"]),
    ("教育公益", &["教育", "服务", "物资"]),
    ("创业招募", &["服务", "场地", "设备"]),
    ("校园公益", &["物资", "教育", "场地"]),
    ("社区服务", &["服务", "场地", "物资"]),
];

const MATCHED_TYPE_SCORE: f64 = 1.0;
const MISMATCHED_TYPE_SCORE: f64 = 0.3;
const ONLINE_LOCATION_SCORE: f64 = 1.0;
const OTHER_LOCATION_SCORE: f64 = 0.5;

const ONLINE_MARKERS: [&str; 2] = ["线上", "online"];

#[derive(Debug, Clone, Serialize)]
pub struct ResourceMatch {
    pub resource: Resource,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub demand: Demand,
    pub matches: Vec<ResourceMatch>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MatchingService;

impl MatchingService {
    pub fn new() -> Self {
        Self
    }

    /// Weighted match score rounded to 4 decimals, halves away from zero
    pub fn calculate_match_score(&self, demand: &Demand, resource: &Resource) -> f64 {
        let availability = if resource.is_available() { 1.0 } else { 0.0 };

        let score = tag_score(&demand.tags, &resource.tags) * TAG_WEIGHT
            + category_score(demand.category(), resource.kind()) * CATEGORY_WEIGHT
            + availability * AVAILABILITY_WEIGHT
            + location_score(resource.location.as_deref()) * LOCATION_WEIGHT;

        (score * 10_000.0).round() / 10_000.0
    }

    /// Available resources scoring at least `min_score`, best first, at most `limit`
    pub fn find_matches(
        &self,
        demand: &Demand,
        resources: &[Resource],
        limit: usize,
        min_score: f64,
    ) -> Vec<ResourceMatch> {
        let mut matches: Vec<ResourceMatch> = resources
            .iter()
            .filter(|resource| resource.is_available())
            .filter_map(|resource| {
                let score = self.calculate_match_score(demand, resource);
                (score >= min_score).then(|| ResourceMatch {
                    resource: resource.clone(),
                    score,
                })
            })
            .collect();

        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(limit);
        matches
    }

    /// Top matches for every active demand; demands without a match are left out
    pub fn get_recommendations(
        &self,
        demands: &[Demand],
        resources: &[Resource],
    ) -> Vec<Recommendation> {
        let recommendations: Vec<Recommendation> = demands
            .iter()
            .filter(|demand| demand.is_active())
            .filter_map(|demand| {
                let matches = self.find_matches(
                    demand,
                    resources,
                    RECOMMENDATIONS_PER_DEMAND,
                    DEFAULT_MIN_SCORE,
                );
                (!matches.is_empty()).then(|| Recommendation {
                    demand: demand.clone(),
                    matches,
                })
            })
            .collect();

        debug!(
            demands = demands.len(),
            resources = resources.len(),
            recommended = recommendations.len(),
            "Built match recommendations"
        );

        recommendations
    }
}

/// Jaccard similarity of the distinct tags; 0 when either side has none
fn tag_score(demand_tags: &[String], resource_tags: &[String]) -> f64 {
    if demand_tags.is_empty() || resource_tags.is_empty() {
        return 0.0;
    }

    let demand_tags: BTreeSet<&str> = demand_tags.iter().map(String::as_str).collect();
    let resource_tags: BTreeSet<&str> = resource_tags.iter().map(String::as_str).collect();

    let shared = demand_tags.intersection(&resource_tags).count();
    let union = demand_tags.union(&resource_tags).count();
    shared as f64 / union as f64
}

fn category_score(category: &str, resource_type: &str) -> f64 {
    match CATEGORY_RESOURCE_TYPES
        .iter()
        .find(|(name, _)| *name == category)
    {
        Some((_, types)) if types.contains(&resource_type) => MATCHED_TYPE_SCORE,
        Some(_) => MISMATCHED_TYPE_SCORE,
        None => 0.0,
    }
}

fn location_score(location: Option<&str>) -> f64 {
    let is_online = location.is_some_and(|location| {
        let location = location.to_lowercase();
        ONLINE_MARKERS
            .iter()
            .any(|marker| location.contains(marker))
    });

    if is_online {
        ONLINE_LOCATION_SCORE
    } else {
        OTHER_LOCATION_SCORE
    }
}
