//! Store error types
//!
//! Defines the errors the store and entity validation can produce.
//! Neither layer produces user-facing messages; the API maps these
//! to status codes.

use crate::store::types::EntityKind;
use thiserror::Error;

/// Errors that can occur when writing to the store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// An entity with the same id already exists; the stored one is kept
    #[error("{kind} {id} already exists")]
    Duplicate { kind: EntityKind, id: u32 },
}

/// Field constraint violations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is {actual} characters long (max: {max})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("{field} = {value} is outside [{min}, {max})")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("mark {0} is outside 0..=5")]
    InvalidMark(u8),
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
