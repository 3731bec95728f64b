//! Query filters for the aggregate endpoints
//!
//! The aggregate queries take a filter object so that narrowing options can
//! be added without changing how the indexes are stored. No option is
//! applied yet: every query sees the full visit list or mark set.

use crate::store::Gender;
use serde::Deserialize;

/// Options narrowing `visits_for_user`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitsFilter {
    /// Only visits with `visited_at` after this timestamp
    pub from_date: Option<i64>,
    /// Only visits with `visited_at` before this timestamp
    pub to_date: Option<i64>,
    /// Only visits to locations in this country
    pub country: Option<String>,
    /// Only visits to locations closer than this distance
    pub to_distance: Option<u32>,
}

/// Options narrowing `average_mark_for_location`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AverageFilter {
    /// Only visits with `visited_at` after this timestamp
    pub from_date: Option<i64>,
    /// Only visits with `visited_at` before this timestamp
    pub to_date: Option<i64>,
    /// Only visitors at least this old, in full years
    pub from_age: Option<u32>,
    /// Only visitors younger than this, in full years
    pub to_age: Option<u32>,
    /// Only visitors of this gender
    pub gender: Option<Gender>,
}

impl VisitsFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl AverageFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
