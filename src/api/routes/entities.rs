//! Entity Routes
//!
//! Point reads and creation of single entities.
//!
//! - GET /{entity}/{id} - Fetch one user, location or visit
//! - POST /{entity}/new - Create one user, location or visit

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult, EMPTY_OBJECT};
use crate::api::routes::{close_connection, json_response, parse_id};
use crate::api::state::AppState;
use crate::store::{EntityKind, Location, User, Validate, Visit};

/// GET /{entity}/{id}
///
/// 404 for an unknown entity kind, a malformed id, or a missing entity.
pub async fn get_entity(
    State(state): State<Arc<AppState>>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> ApiResult<Response> {
    let Path((entity, id)) = path.map_err(|_| ApiError::NotFound)?;
    let kind = EntityKind::from_collection(&entity).ok_or(ApiError::NotFound)?;
    let id = parse_id(&id).ok_or(ApiError::NotFound)?;
    let store = &state.store;

    let body = match kind {
        EntityKind::User => to_json(&*store.get_user(id).ok_or(ApiError::NotFound)?)?,
        EntityKind::Location => to_json(&*store.get_location(id).ok_or(ApiError::NotFound)?)?,
        EntityKind::Visit => to_json(&*store.get_visit(id).ok_or(ApiError::NotFound)?)?,
    };

    Ok(json_response(StatusCode::OK, body))
}

/// POST /{entity}/new
///
/// The body is always `{}` and the connection is closed after the
/// response; only the status tells success (200) from a bad body (400)
/// or an unknown entity kind / non-`new` action (404). A path that does
/// not decode is a 404 and a body that cannot be read (over the size
/// limit) is a 400.
pub async fn create_entity(
    State(state): State<Arc<AppState>>,
    path: Result<Path<(String, String)>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let result = path
        .map_err(|_| ApiError::NotFound)
        .and_then(|Path((entity, action))| target(&entity, &action))
        .and_then(|kind| {
            let body = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
            create(&state, kind, &body)
        });

    let response = match result {
        Ok(()) => json_response(StatusCode::OK, EMPTY_OBJECT),
        Err(e) => e.into_response(),
    };
    close_connection(response)
}

/// Entity kind a POST path creates
fn target(entity: &str, action: &str) -> ApiResult<EntityKind> {
    let kind = EntityKind::from_collection(entity).ok_or(ApiError::NotFound)?;
    if action != "new" {
        // Updates of existing entities are not supported
        return Err(ApiError::NotFound);
    }
    Ok(kind)
}

fn create(state: &AppState, kind: EntityKind, body: &[u8]) -> ApiResult<()> {
    match kind {
        EntityKind::User => state.store.insert_user(decode::<User>(kind, body)?)?,
        EntityKind::Location => state.store.insert_location(decode::<Location>(kind, body)?)?,
        EntityKind::Visit => state.store.insert_visit(decode::<Visit>(kind, body)?)?,
    }

    Ok(())
}

/// Decode and validate a request body
fn decode<T: DeserializeOwned + Validate>(kind: EntityKind, body: &[u8]) -> ApiResult<T> {
    let entity: T = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid {}: {}", kind, e)))?;
    entity.validate()?;
    Ok(entity)
}

fn to_json<T: Serialize>(value: &T) -> ApiResult<Vec<u8>> {
    serde_json::to_vec(value)
        .map_err(|e| ApiError::Internal(format!("Failed to serialize response: {}", e)))
}
