use super::{
    dates::{days_between, parse_date},
    ordered::{Distribution, OrderedMap},
    records::{ActivityCounters, Demand, Resource, Tagged, Timestamped, User},
};
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

pub const DEFAULT_TREND_DAYS: u32 = 30;
pub const DEFAULT_TAG_LIMIT: usize = 10;

/// Percentage of `numerator` over `denominator`, 0 when there is nothing to divide by
pub fn calculate_rate(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    round_to(numerator as f64 / denominator as f64 * 100.0, 2)
}

/// Round to `decimals` places, sending exact halves to the even neighbour
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Local wall-clock time used to stamp generated documents
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemandStats {
    pub total: u64,
    pub by_status: Distribution,
    pub by_category: Distribution,
    pub completion_rate: f64,
    pub avg_completion_days: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceStats {
    pub total: u64,
    pub by_type: Distribution,
    pub by_status: Distribution,
    pub availability_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub total: u64,
    pub by_type: Distribution,
    pub verified_count: u64,
    pub verification_rate: f64,
    pub total_collaborations: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformSummary {
    pub total_demands: u64,
    pub total_resources: u64,
    pub total_users: u64,
    pub total_collaborations: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformOverview {
    pub summary: PlatformSummary,
    pub demands: DemandStats,
    pub resources: ResourceStats,
    pub users: UserStats,
    pub generated_at: NaiveDateTime,
}

/// Daily creation counts; `dates[i]` pairs with `counts[i]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trends {
    pub dates: Vec<String>,
    pub counts: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: u64,
}

/// Demand counts for one category, split by lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub total: u64,
    pub open: u64,
    pub in_progress: u64,
    pub completed: u64,
    pub closed: u64,
}

impl CategoryBreakdown {
    fn record(&mut self, status: &str) {
        self.total += 1;
        match status {
            "open" => self.open += 1,
            "in_progress" => self.in_progress += 1,
            "completed" => self.completed += 1,
            "closed" => self.closed += 1,
            _ => {}
        }
    }
}

/// Users of one type and their summed activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTypeActivity {
    pub count: u64,
    #[serde(flatten)]
    pub activity: ActivityCounters,
}

/// Aggregations over caller-supplied record lists.
///
/// Holds no state; every method is a pure function of its arguments apart
/// from reading the local clock for timestamps and trend windows.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatisticsService;

impl StatisticsService {
    pub fn new() -> Self {
        Self
    }

    pub fn calculate_demand_stats(&self, demands: &[Demand]) -> DemandStats {
        if demands.is_empty() {
            return DemandStats::default();
        }

        let total = demands.len() as u64;
        let by_status = Distribution::tally(demands.iter().map(Demand::status));
        let by_category = Distribution::tally(demands.iter().map(Demand::category));

        let completion_days: Vec<i64> = demands
            .iter()
            .filter(|d| d.is_completed())
            .filter_map(|d| {
                let created = parse_date(d.created_at.as_deref())?;
                let updated = parse_date(d.updated_at.as_deref())?;
                Some(days_between(created, updated))
            })
            .collect();

        let avg_completion_days = if completion_days.is_empty() {
            0.0
        } else {
            completion_days.iter().sum::<i64>() as f64 / completion_days.len() as f64
        };

        debug!(
            total,
            completed_with_dates = completion_days.len(),
            "Calculated demand statistics"
        );

        DemandStats {
            total,
            completion_rate: calculate_rate(by_status.count("completed"), total),
            avg_completion_days: round_to(avg_completion_days, 1),
            by_status,
            by_category,
        }
    }

    pub fn calculate_resource_stats(&self, resources: &[Resource]) -> ResourceStats {
        if resources.is_empty() {
            return ResourceStats::default();
        }

        let total = resources.len() as u64;
        let by_type = Distribution::tally(resources.iter().map(Resource::kind));
        let by_status = Distribution::tally(resources.iter().map(Resource::status));

        ResourceStats {
            total,
            availability_rate: calculate_rate(by_status.count("available"), total),
            by_type,
            by_status,
        }
    }

    pub fn calculate_user_stats(&self, users: &[User]) -> UserStats {
        if users.is_empty() {
            return UserStats::default();
        }

        let total = users.len() as u64;
        let verified_count = users.iter().filter(|u| u.verified).count() as u64;

        UserStats {
            total,
            by_type: Distribution::tally(users.iter().map(User::kind)),
            verified_count,
            verification_rate: calculate_rate(verified_count, total),
            total_collaborations: users.iter().map(|u| u.stats.collaborations).sum(),
        }
    }

    pub fn calculate_platform_overview(
        &self,
        demands: &[Demand],
        resources: &[Resource],
        users: &[User],
    ) -> PlatformOverview {
        let demand_stats = self.calculate_demand_stats(demands);
        let resource_stats = self.calculate_resource_stats(resources);
        let user_stats = self.calculate_user_stats(users);

        PlatformOverview {
            summary: PlatformSummary {
                total_demands: demand_stats.total,
                total_resources: resource_stats.total,
                total_users: user_stats.total,
                total_collaborations: user_stats.total_collaborations,
            },
            demands: demand_stats,
            resources: resource_stats,
            users: user_stats,
            generated_at: now(),
        }
    }

    /// Daily creation counts for the `days` days ending today
    pub fn get_trends<T: Timestamped>(&self, items: &[T], days: u32) -> Trends {
        self.get_trends_ending(items, days, Local::now().date_naive())
    }

    /// Daily creation counts for the `days` days ending at `today`, oldest first
    pub fn get_trends_ending<T: Timestamped>(
        &self,
        items: &[T],
        days: u32,
        today: NaiveDate,
    ) -> Trends {
        let mut window = Vec::with_capacity(days as usize);
        let mut day = Some(today);
        for _ in 0..days {
            let Some(current) = day else { break };
            window.push(current);
            day = current.pred_opt();
        }
        window.reverse();

        let mut counts = vec![0u64; window.len()];
        if let Some(&start) = window.first() {
            for created in items.iter().filter_map(|item| parse_date(item.created_at())) {
                let offset = (created.date() - start).num_days();
                if (0..counts.len() as i64).contains(&offset) {
                    counts[offset as usize] += 1;
                }
            }
        }

        Trends {
            dates: window.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect(),
            counts,
        }
    }

    /// The `limit` most frequent tags; ties keep first-seen order
    pub fn get_top_tags<T: Tagged>(&self, items: &[T], limit: usize) -> Vec<TagCount> {
        let counts = Distribution::tally(
            items
                .iter()
                .flat_map(|item| item.tags().iter().map(String::as_str)),
        );

        counts
            .most_common(limit)
            .into_iter()
            .map(|(tag, count)| TagCount {
                tag: tag.to_string(),
                count,
            })
            .collect()
    }

    /// Per-category status counts, largest category first
    pub fn category_breakdown(&self, demands: &[Demand]) -> OrderedMap<CategoryBreakdown> {
        let mut categories: OrderedMap<CategoryBreakdown> = OrderedMap::new();
        for demand in demands {
            categories
                .entry_or_default(demand.category())
                .record(demand.status());
        }
        categories.sort_by(|a, b| b.total.cmp(&a.total));
        categories
    }

    /// Per-user-type counts and summed activity, in first-seen order
    pub fn user_type_breakdown(&self, users: &[User]) -> OrderedMap<UserTypeActivity> {
        let mut types: OrderedMap<UserTypeActivity> = OrderedMap::new();
        for user in users {
            let entry = types.entry_or_default(user.kind());
            entry.count += 1;
            entry.activity.add(&user.stats);
        }
        types
    }

    /// Distinct tags across `items`, lexically ordered
    pub fn tag_set<'a, T, I>(&self, items: I) -> BTreeSet<&'a str>
    where
        T: Tagged + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        items
            .into_iter()
            .flat_map(|item| item.tags().iter().map(String::as_str))
            .collect()
    }
}
