//! Travels Aggregation Indexes
//!
//! Derived views over visit data, maintained alongside the primary store:
//!
//! - **UserVisits**: user id → visits in commit order
//! - **LocationMarks**: location id → marks with a running sum
//! - **Filters**: optional query parameters accepted by the aggregate queries
//!
//! # Architecture
//!
//! ```text
//! insert_visit(v)
//!        ↓
//! visits[v.id]            (primary store shard)
//! user_visits[v.user]     += v
//! location_marks[v.location] += v.mark
//!        ↓
//! all three shard locks held together, so readers never see
//! the visit in one place and not the others
//! ```

mod filter;
mod location_marks;
mod user_visits;

pub use filter::{AverageFilter, VisitsFilter};
pub use location_marks::{round_to, LocationMarks, AVG_DECIMALS};
pub use user_visits::UserVisits;
