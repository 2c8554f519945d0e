use serde::{Deserialize, Serialize};

/// Defaults and limits for analytics requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Trend window used when a request does not name one
    #[serde(default = "default_trend_days")]
    pub default_trend_days: u32,
    /// Largest trend window a request may ask for
    #[serde(default = "default_max_trend_days")]
    pub max_trend_days: u32,
    /// Number of tags returned when a request does not name a limit
    #[serde(default = "default_tag_limit")]
    pub default_tag_limit: usize,
    /// Number of matches returned when a request does not name a limit
    #[serde(default = "default_match_limit")]
    pub default_match_limit: usize,
    /// Lowest score a match request accepts when it does not name one
    #[serde(default = "default_min_match_score")]
    pub default_min_match_score: f64,
    /// Directory that exported reports are written into
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
}

fn default_trend_days() -> u32 {
    super::statistics::DEFAULT_TREND_DAYS
}

fn default_max_trend_days() -> u32 {
    366
}

fn default_tag_limit() -> usize {
    super::statistics::DEFAULT_TAG_LIMIT
}

fn default_match_limit() -> usize {
    super::matching::DEFAULT_MATCH_LIMIT
}

fn default_min_match_score() -> f64 {
    super::matching::DEFAULT_MIN_SCORE
}

fn default_export_dir() -> String {
    "reports".to_string()
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            default_trend_days: default_trend_days(),
            max_trend_days: default_max_trend_days(),
            default_tag_limit: default_tag_limit(),
            default_match_limit: default_match_limit(),
            default_min_match_score: default_min_match_score(),
            export_dir: default_export_dir(),
        }
    }
}
