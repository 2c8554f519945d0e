//! Platform analytics
//!
//! Statistics, report documents and demand/resource match scoring computed
//! over caller-supplied records. Nothing here performs I/O except
//! [`ReportGenerator::export_to_json`].

pub mod config;
pub mod dates;
pub mod matching;
pub mod ordered;
pub mod records;
pub mod reports;
pub mod statistics;

pub use config::AnalyticsConfig;
pub use matching::{MatchingService, Recommendation, ResourceMatch};
pub use ordered::{Distribution, OrderedMap};
pub use records::{Dataset, Demand, Item, Resource, User};
pub use reports::{Report, ReportGenerator, ReportKind};
pub use statistics::{StatisticsService, calculate_rate};
