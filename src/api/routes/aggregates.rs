//! Aggregate Routes
//!
//! Queries answered from the aggregation indexes.
//!
//! - GET /users/{id}/visits - Visits of a user
//! - GET /locations/{id}/avg - Average mark of a location

use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    response::Response,
};
use std::sync::Arc;

use crate::api::dto::{AverageResponse, VisitsResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::routes::{json_response, parse_id};
use crate::api::state::AppState;
use crate::index::{AverageFilter, VisitsFilter};
use crate::store::EntityKind;

/// GET /{entity}/{id}/{verb}
///
/// Only `users/{id}/visits` and `locations/{id}/avg` exist; every other
/// combination is a 404.
pub async fn get_aggregate(
    State(state): State<Arc<AppState>>,
    path: Result<Path<(String, String, String)>, PathRejection>,
) -> ApiResult<Response> {
    let Path((entity, id, verb)) = path.map_err(|_| ApiError::NotFound)?;
    let id = parse_id(&id).ok_or(ApiError::NotFound)?;

    match (EntityKind::from_collection(&entity), verb.as_str()) {
        (Some(EntityKind::User), "visits") => user_visits(&state, id),
        (Some(EntityKind::Location), "avg") => location_average(&state, id),
        _ => Err(ApiError::NotFound),
    }
}

fn user_visits(state: &AppState, id: u32) -> ApiResult<Response> {
    let visits = state
        .store
        .visits_for_user(id, &VisitsFilter::default())
        .ok_or(ApiError::NotFound)?;

    let body = serde_json::to_vec(&VisitsResponse {
        visits: visits.iter().map(|v| &**v).collect(),
    })
    .map_err(|e| ApiError::Internal(format!("Failed to serialize visits: {}", e)))?;

    Ok(json_response(StatusCode::OK, body))
}

fn location_average(state: &AppState, id: u32) -> ApiResult<Response> {
    let avg = state
        .store
        .average_mark_for_location(id, &AverageFilter::default())
        .ok_or(ApiError::NotFound)?;

    Ok(json_response(
        StatusCode::OK,
        AverageResponse { avg }.to_json(),
    ))
}
