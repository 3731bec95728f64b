//! Entity types for the Travels store
//!
//! This module defines the three stored entity kinds and their field rules:
//! - `User`: a traveller profile
//! - `Location`: a place that can be visited
//! - `Visit`: one user's visit to one location, with a mark
//! - `Gender` and `EntityKind`: classification enums

use crate::store::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Lower bound (inclusive) of `User::birth_date`: 1930-01-01T00:00:00Z
pub const BIRTH_DATE_MIN: i64 = -1_262_304_000;
/// Upper bound (exclusive) of `User::birth_date`: 1999-01-01T00:00:00Z
pub const BIRTH_DATE_MAX: i64 = 915_148_800;
/// Lower bound (inclusive) of `Visit::visited_at`: 2000-01-01T00:00:00Z
pub const VISITED_AT_MIN: i64 = 946_684_800;
/// Upper bound (exclusive) of `Visit::visited_at`: 2015-01-01T00:00:00Z
pub const VISITED_AT_MAX: i64 = 1_420_070_400;

pub const MAX_EMAIL_LEN: usize = 100;
pub const MAX_NAME_LEN: usize = 50;
pub const MAX_COUNTRY_LEN: usize = 50;
pub const MAX_CITY_LEN: usize = 50;
pub const MAX_MARK: u8 = 5;

/// A traveller profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Externally assigned unique identifier
    pub id: u32,
    /// Email address, up to 100 characters
    pub email: String,
    /// Up to 50 characters
    pub first_name: String,
    /// Up to 50 characters
    pub last_name: String,
    pub gender: Gender,
    /// Unix timestamp in seconds, within [1930-01-01, 1999-01-01)
    pub birth_date: i64,
}

/// A place that can be visited
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Location {
    /// Externally assigned unique identifier
    pub id: u32,
    /// Free-form description of the place
    pub place: String,
    /// Up to 50 characters
    pub country: String,
    /// Up to 50 characters
    pub city: String,
    /// Distance from the city in kilometers
    pub distance: u32,
}

/// One visit of a user to a location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Visit {
    /// Externally assigned unique identifier
    pub id: u32,
    /// Visited location id
    pub location: u32,
    /// Visiting user id
    pub user: u32,
    /// Unix timestamp in seconds, within [2000-01-01, 2015-01-01)
    pub visited_at: i64,
    /// Mark from 0 to 5 inclusive
    pub mark: u8,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Gender {
    #[serde(rename = "m")]
    Male,
    #[serde(rename = "f")]
    Female,
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gender::Male => write!(f, "m"),
            Gender::Female => write!(f, "f"),
        }
    }
}

/// The three kinds of stored entities, as named in request paths
/// and archive sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Location,
    Visit,
}

impl EntityKind {
    /// Get all kinds for iteration
    pub fn all() -> &'static [EntityKind] {
        &[EntityKind::User, EntityKind::Location, EntityKind::Visit]
    }

    /// Plural collection name used in paths and archive documents
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::User => "users",
            EntityKind::Location => "locations",
            EntityKind::Visit => "visits",
        }
    }

    /// Resolve a collection name such as `users`
    pub fn from_collection(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.collection() == name)
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::User => write!(f, "user"),
            EntityKind::Location => write!(f, "location"),
            EntityKind::Visit => write!(f, "visit"),
        }
    }
}

/// Field-level constraints checked before an entity is accepted from a client
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

impl Validate for User {
    fn validate(&self) -> Result<(), ValidationError> {
        check_len("email", &self.email, MAX_EMAIL_LEN)?;
        check_len("first_name", &self.first_name, MAX_NAME_LEN)?;
        check_len("last_name", &self.last_name, MAX_NAME_LEN)?;
        check_range("birth_date", self.birth_date, BIRTH_DATE_MIN, BIRTH_DATE_MAX)
    }
}

impl Validate for Location {
    fn validate(&self) -> Result<(), ValidationError> {
        check_len("country", &self.country, MAX_COUNTRY_LEN)?;
        check_len("city", &self.city, MAX_CITY_LEN)
    }
}

impl Validate for Visit {
    fn validate(&self) -> Result<(), ValidationError> {
        check_range("visited_at", self.visited_at, VISITED_AT_MIN, VISITED_AT_MAX)?;
        if self.mark > MAX_MARK {
            return Err(ValidationError::InvalidMark(self.mark));
        }
        Ok(())
    }
}

/// Lengths are counted in Unicode scalar values, not bytes
fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong { field, max, actual });
    }
    Ok(())
}

/// Half-open range check: `min <= value < max`
fn check_range(field: &'static str, value: i64, min: i64, max: i64) -> Result<(), ValidationError> {
    if value < min || value >= max {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}
