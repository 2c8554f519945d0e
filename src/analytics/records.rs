//! Typed views over the platform's demand, resource and user records.
//!
//! Every field is optional on the wire. Missing fields and explicit `null`
//! fall back to the documented defaults, so aggregation never has to deal
//! with absent data.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const UNKNOWN: &str = "unknown";
pub const UNCATEGORIZED: &str = "uncategorized";

/// Demand lifecycle statuses tracked by category breakdowns
pub const DEMAND_STATUSES: [&str; 4] = ["open", "in_progress", "completed", "closed"];

/// Records that carry a creation timestamp
pub trait Timestamped {
    fn created_at(&self) -> Option<&str>;
}

/// Records that carry tags
pub trait Tagged {
    fn tags(&self) -> &[String];
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Demand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_tags")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Demand {
    pub fn status(&self) -> &str {
        self.status.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn category(&self) -> &str {
        self.category.as_deref().unwrap_or(UNCATEGORIZED)
    }

    pub fn is_completed(&self) -> bool {
        self.status.as_deref() == Some("completed")
    }

    /// Open or in progress
    pub fn is_active(&self) -> bool {
        matches!(self.status.as_deref(), Some("open" | "in_progress"))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_tags")]
    pub tags: Vec<String>,
    /// Free-text location; containing `线上` or `online` marks an online resource
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Resource {
    pub fn status(&self) -> &str {
        self.status.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn kind(&self) -> &str {
        self.kind.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn is_available(&self) -> bool {
        self.status.as_deref() == Some("available")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub verified: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stats: ActivityCounters,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl User {
    pub fn kind(&self) -> &str {
        self.kind.as_deref().unwrap_or(UNKNOWN)
    }
}

/// Per-user activity counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityCounters {
    #[serde(default, deserialize_with = "null_as_default")]
    pub demands_posted: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub resources_provided: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub collaborations: u64,
}

impl ActivityCounters {
    pub fn add(&mut self, other: &ActivityCounters) {
        self.demands_posted += other.demands_posted;
        self.resources_provided += other.resources_provided;
        self.collaborations += other.collaborations;
    }
}

/// Any record with a creation date and tags
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_tags")]
    pub tags: Vec<String>,
}

/// The three collections plus optional externally computed matches
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default, deserialize_with = "null_as_default")]
    pub demands: Vec<Demand>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub resources: Vec<Resource>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub users: Vec<User>,
    #[serde(default)]
    pub matches: Option<Vec<Value>>,
}

macro_rules! impl_record_traits {
    ($($record:ty),*) => {
        $(
            impl Timestamped for $record {
                fn created_at(&self) -> Option<&str> {
                    self.created_at.as_deref()
                }
            }
        )*
    };
}

impl_record_traits!(Demand, Resource, User, Item);

impl Tagged for Demand {
    fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl Tagged for Resource {
    fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl Tagged for Item {
    fn tags(&self) -> &[String] {
        &self.tags
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts any JSON value; only arrays contribute, and only their string elements
fn lenient_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let tags = match Value::deserialize(deserializer)? {
        Value::Array(values) => values
            .into_iter()
            .filter_map(|value| match value {
                Value::String(tag) => Some(tag),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok(tags)
}
