//! Titled, timestamped report documents built on top of [`StatisticsService`].

use super::{
    ordered::OrderedMap,
    records::{ActivityCounters, Dataset, Demand, Resource, User},
    statistics::{
        CategoryBreakdown, StatisticsService, UserTypeActivity, calculate_rate, now, round_to,
    },
};
use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    fmt,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
    str::FromStr,
};
use thiserror::Error;
use tracing::{info, warn};

pub const SUMMARY_REPORT_TITLE: &str = "Platform Overview Report";
pub const CATEGORY_REPORT_TITLE: &str = "Demand Category Report";
pub const USER_ACTIVITY_REPORT_TITLE: &str = "User Activity Report";
pub const MATCHING_REPORT_TITLE: &str = "Matching Analysis Report";

/// Maximum number of shared tags listed in a matching report
const COMMON_TAGS_SAMPLE: usize = 20;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Summary,
    Category,
    UserActivity,
    Matching,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Summary => "summary",
            ReportKind::Category => "category",
            ReportKind::UserActivity => "user_activity",
            ReportKind::Matching => "matching",
        }
    }

    pub fn default_title(&self) -> &'static str {
        match self {
            ReportKind::Summary => SUMMARY_REPORT_TITLE,
            ReportKind::Category => CATEGORY_REPORT_TITLE,
            ReportKind::UserActivity => USER_ACTIVITY_REPORT_TITLE,
            ReportKind::Matching => MATCHING_REPORT_TITLE,
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "summary" => Ok(ReportKind::Summary),
            "category" => Ok(ReportKind::Category),
            "user_activity" | "user-activity" => Ok(ReportKind::UserActivity),
            "matching" => Ok(ReportKind::Matching),
            other => Err(format!("Unknown report kind: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryCounts {
    pub total_demands: u64,
    pub active_demands: u64,
    pub total_resources: u64,
    pub available_resources: u64,
    pub total_users: u64,
    pub verified_users: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub demand_activity_rate: f64,
    pub resource_availability_rate: f64,
    pub user_verification_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub title: String,
    pub generated_at: NaiveDateTime,
    pub summary: SummaryCounts,
    pub metrics: SummaryMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryReport {
    pub title: String,
    pub generated_at: NaiveDateTime,
    pub total_demands: u64,
    pub categories: OrderedMap<CategoryBreakdown>,
    pub category_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityAverages {
    pub demands_per_user: f64,
    pub resources_per_user: f64,
    pub collaborations_per_user: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserActivityReport {
    pub title: String,
    pub generated_at: NaiveDateTime,
    pub total_users: u64,
    pub user_types: OrderedMap<UserTypeActivity>,
    pub totals: ActivityCounters,
    pub averages: ActivityAverages,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagAnalysis {
    pub demand_tags_count: u64,
    pub resource_tags_count: u64,
    pub common_tags_count: u64,
    pub common_tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingReport {
    pub title: String,
    pub generated_at: NaiveDateTime,
    pub active_demands: u64,
    pub available_resources: u64,
    pub tag_analysis: TagAnalysis,
    pub potential_match_rate: f64,
    pub matches_provided: u64,
}

/// Any report the generator can produce
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Report {
    Summary(SummaryReport),
    Category(CategoryReport),
    UserActivity(UserActivityReport),
    Matching(MatchingReport),
}

impl Report {
    pub fn title(&self) -> &str {
        match self {
            Report::Summary(r) => &r.title,
            Report::Category(r) => &r.title,
            Report::UserActivity(r) => &r.title,
            Report::Matching(r) => &r.title,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReportGenerator {
    statistics: StatisticsService,
}

impl ReportGenerator {
    pub fn new(statistics: StatisticsService) -> Self {
        Self { statistics }
    }

    pub fn statistics(&self) -> &StatisticsService {
        &self.statistics
    }

    /// Build the report of `kind` from `dataset`, using the kind's default title when none is given
    pub fn generate(&self, kind: ReportKind, dataset: &Dataset, title: Option<&str>) -> Report {
        let title = title.unwrap_or(kind.default_title());
        let report = match kind {
            ReportKind::Summary => Report::Summary(self.generate_summary_report(
                &dataset.demands,
                &dataset.resources,
                &dataset.users,
                title,
            )),
            ReportKind::Category => {
                Report::Category(self.generate_category_report(&dataset.demands, title))
            }
            ReportKind::UserActivity => {
                Report::UserActivity(self.generate_user_activity_report(&dataset.users, title))
            }
            ReportKind::Matching => Report::Matching(self.generate_matching_report(
                &dataset.demands,
                &dataset.resources,
                dataset.matches.as_deref(),
                title,
            )),
        };

        crate::metrics::track_report_generated(kind.as_str());
        report
    }

    pub fn generate_summary_report(
        &self,
        demands: &[Demand],
        resources: &[Resource],
        users: &[User],
        title: &str,
    ) -> SummaryReport {
        let demand_stats = self.statistics.calculate_demand_stats(demands);
        let resource_stats = self.statistics.calculate_resource_stats(resources);
        let user_stats = self.statistics.calculate_user_stats(users);

        let active_demands =
            demand_stats.by_status.count("open") + demand_stats.by_status.count("in_progress");
        let available_resources = resource_stats.by_status.count("available");

        SummaryReport {
            title: title.to_string(),
            generated_at: now(),
            summary: SummaryCounts {
                total_demands: demand_stats.total,
                active_demands,
                total_resources: resource_stats.total,
                available_resources,
                total_users: user_stats.total,
                verified_users: user_stats.verified_count,
            },
            metrics: SummaryMetrics {
                demand_activity_rate: calculate_rate(active_demands, demand_stats.total),
                resource_availability_rate: resource_stats.availability_rate,
                user_verification_rate: user_stats.verification_rate,
            },
        }
    }

    pub fn generate_category_report(&self, demands: &[Demand], title: &str) -> CategoryReport {
        let categories = self.statistics.category_breakdown(demands);

        CategoryReport {
            title: title.to_string(),
            generated_at: now(),
            total_demands: demands.len() as u64,
            category_count: categories.len() as u64,
            categories,
        }
    }

    pub fn generate_user_activity_report(&self, users: &[User], title: &str) -> UserActivityReport {
        let user_types = self.statistics.user_type_breakdown(users);

        let mut totals = ActivityCounters::default();
        for (_, entry) in user_types.iter() {
            totals.add(&entry.activity);
        }

        let total_users = users.len() as u64;
        let per_user = |sum: u64| {
            if total_users == 0 {
                0.0
            } else {
                round_to(sum as f64 / total_users as f64, 2)
            }
        };

        UserActivityReport {
            title: title.to_string(),
            generated_at: now(),
            total_users,
            user_types,
            averages: ActivityAverages {
                demands_per_user: per_user(totals.demands_posted),
                resources_per_user: per_user(totals.resources_provided),
                collaborations_per_user: per_user(totals.collaborations),
            },
            totals,
        }
    }

    pub fn generate_matching_report(
        &self,
        demands: &[Demand],
        resources: &[Resource],
        matches: Option<&[Value]>,
        title: &str,
    ) -> MatchingReport {
        let active: Vec<&Demand> = demands.iter().filter(|d| d.is_active()).collect();
        let available: Vec<&Resource> = resources.iter().filter(|r| r.is_available()).collect();

        let demand_tags = self.statistics.tag_set(active.iter().copied());
        let resource_tags = self.statistics.tag_set(available.iter().copied());
        let common: Vec<&str> = demand_tags.intersection(&resource_tags).copied().collect();

        MatchingReport {
            title: title.to_string(),
            generated_at: now(),
            active_demands: active.len() as u64,
            available_resources: available.len() as u64,
            tag_analysis: TagAnalysis {
                demand_tags_count: demand_tags.len() as u64,
                resource_tags_count: resource_tags.len() as u64,
                common_tags_count: common.len() as u64,
                common_tags: common
                    .iter()
                    .take(COMMON_TAGS_SAMPLE)
                    .map(|tag| tag.to_string())
                    .collect(),
            },
            potential_match_rate: calculate_rate(common.len() as u64, demand_tags.len() as u64),
            matches_provided: matches.map_or(0, |m| m.len() as u64),
        }
    }

    /// Write `report` to `path` as pretty-printed UTF-8 JSON.
    ///
    /// Returns `false` when the file cannot be written and also when `report`
    /// fails to serialize (a map with non-string keys, for instance). Both are
    /// logged at warn level and never propagate. The report types in this
    /// module always serialize.
    pub fn export_to_json<T: Serialize>(&self, report: &T, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        match write_json(report, path) {
            Ok(()) => {
                info!(path = %path.display(), "Exported report");
                true
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to export report");
                false
            }
        }
    }
}

fn write_json<T: Serialize>(report: &T, path: &Path) -> Result<(), ExportError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.flush()?;
    Ok(())
}
