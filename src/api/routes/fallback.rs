//! Fallback for requests matching no route
//!
//! GET and POST on an unknown path shape are 404; any other method is 405.
//! POST responses close the connection like every other POST.

use axum::{
    http::Method,
    response::{IntoResponse, Response},
};

use crate::api::error::ApiError;
use crate::api::routes::close_connection;

pub async fn unmatched(method: Method) -> Response {
    if method == Method::GET {
        ApiError::NotFound.into_response()
    } else if method == Method::POST {
        close_connection(ApiError::NotFound.into_response())
    } else {
        ApiError::MethodNotAllowed.into_response()
    }
}
