//! Response bodies of the aggregate endpoints
//!
//! Entities themselves are serialized directly from the store types.

use serde::Serialize;

use crate::index::AVG_DECIMALS;
use crate::store::Visit;

/// Body of `GET /users/{id}/visits`
#[derive(Debug, Serialize)]
pub struct VisitsResponse<'a> {
    pub visits: Vec<&'a Visit>,
}

/// Body of `GET /locations/{id}/avg`
///
/// Written by hand because the average is always printed with exactly
/// five decimals, which a float serializer does not do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AverageResponse {
    pub avg: f64,
}

impl AverageResponse {
    pub fn to_json(&self) -> String {
        format!(
            "{{\"avg\": {:.*}}}",
            AVG_DECIMALS as usize, self.avg
        )
    }
}
