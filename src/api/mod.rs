//! Travels HTTP API
//!
//! HTTP layer for the entity store, built with Axum.
//!
//! # Endpoints
//!
//! ## Entities
//! - `GET /{users|locations|visits}/{id}` - Fetch one entity
//! - `POST /{users|locations|visits}/new` - Create one entity
//!
//! ## Aggregates
//! - `GET /users/{id}/visits` - Visits of a user
//! - `GET /locations/{id}/avg` - Average mark of a location
//!
//! Every other path shape is 404 for GET and POST, and any other method,
//! HEAD included, is 405.
//!
//! # Example
//!
//! ```rust,ignore
//! use travels::api::{serve, ApiConfig, AppState};
//! use travels::store::{EntityStore, StoreConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(EntityStore::new(StoreConfig::default()));
//!     let config = ApiConfig::default();
//!
//!     let state = AppState::new(store, config.clone());
//!     serve(state, &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod rps;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{extract::DefaultBodyLimit, middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let access_log = state.config.access_log;
    let max_body_size = state.config.max_body_size;
    let requests = Arc::clone(&state.requests);

    // Create shared state
    let shared_state = Arc::new(state);

    // `get` would also answer HEAD; only GET and POST are served
    let router = Router::new()
        .route(
            "/:entity/:id",
            get(routes::entities::get_entity)
                .head(routes::fallback::unmatched)
                .post(routes::entities::create_entity),
        )
        .route(
            "/:entity/:id/:verb",
            get(routes::aggregates::get_aggregate)
                .head(routes::fallback::unmatched)
                .post(routes::fallback::unmatched),
        )
        .fallback(routes::fallback::unmatched)
        .with_state(shared_state)
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(middleware::from_fn_with_state(requests, rps::count_requests));

    if access_log {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let watcher = config
        .rps_watcher
        .then(|| rps::start_rps_watcher(Arc::clone(&state.requests)));
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Travels API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    if let Some(watcher) = watcher {
        watcher.abort();
    }

    tracing::info!("Travels API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{EntityStore, Gender, Location, StoreConfig, User, Visit};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> (Router, Arc<EntityStore>) {
        let store = Arc::new(EntityStore::new(StoreConfig::new(4)));
        let state = AppState::new(Arc::clone(&store), ApiConfig::default());
        (build_router(state), store)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: &str) -> Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn seed(store: &EntityStore) {
        store
            .insert_user(User {
                id: 1,
                email: "john@mail.com".to_string(),
                first_name: "John".to_string(),
                last_name: "Doe".to_string(),
                gender: Gender::Male,
                birth_date: 100_000_000,
            })
            .unwrap();
        store
            .insert_location(Location {
                id: 10,
                place: "Museum".to_string(),
                country: "France".to_string(),
                city: "Paris".to_string(),
                distance: 7,
            })
            .unwrap();
        for (id, mark) in [(100, 5), (101, 3), (102, 4)] {
            store
                .insert_visit(Visit {
                    id,
                    location: 10,
                    user: 1,
                    visited_at: 1_300_000_000 - i64::from(id),
                    mark,
                })
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_create_then_get_user() {
        let (app, _store) = create_test_app();
        let user = r#"{"id":1,"email":"a@b.c","first_name":"A","last_name":"B","gender":"m","birth_date":0}"#;

        let response = send(&app, "POST", "/users/new", user).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONNECTION], "close");
        assert_eq!(body_string(response).await, "{}");

        let response = send(&app, "GET", "/users/1", "").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");

        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        let expected: serde_json::Value = serde_json::from_str(user).unwrap();
        assert_eq!(body, expected);
        assert!(body.get("valid").is_none());
    }

    #[tokio::test]
    async fn test_get_location_and_visit() {
        let (app, store) = create_test_app();
        seed(&store);

        let response = send(&app, "GET", "/locations/10", "").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Location = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body.city, "Paris");

        let response = send(&app, "GET", "/visits/101", "").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Visit = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body.mark, 3);
    }

    #[tokio::test]
    async fn test_get_not_found_cases() {
        let (app, store) = create_test_app();
        seed(&store);

        for uri in [
            "/users/abc",
            "/users/-1",
            "/users/4294967296",
            "/widgets/1",
            "/users/2",
            "/visits/1",
            "/users",
            "/users/1/",
            "/users/1/visits/extra",
            "/",
        ] {
            let response = send(&app, "GET", uri, "").await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "GET {uri}");
        }
    }

    #[tokio::test]
    async fn test_user_visits() {
        let (app, store) = create_test_app();
        seed(&store);

        let response = send(&app, "GET", "/users/1/visits", "").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        let ids: Vec<u64> = body["visits"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["id"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![100, 101, 102]);
        assert_eq!(body["visits"][0]["visited_at"], 1_299_999_900);
    }

    #[tokio::test]
    async fn test_user_visits_presence() {
        let (app, store) = create_test_app();

        let response = send(&app, "GET", "/users/42/visits", "").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        seed(&store);
        store
            .insert_user(User {
                id: 42,
                email: "x@y.z".to_string(),
                first_name: "X".to_string(),
                last_name: "Y".to_string(),
                gender: Gender::Female,
                birth_date: 0,
            })
            .unwrap();

        let response = send(&app, "GET", "/users/42/visits", "").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, r#"{"visits":[]}"#);
    }

    #[tokio::test]
    async fn test_location_average() {
        let (app, store) = create_test_app();
        seed(&store);

        let response = send(&app, "GET", "/locations/10/avg", "").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, r#"{"avg": 4.00000}"#);

        let response = send(&app, "GET", "/locations/11/avg", "").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_aggregates() {
        let (app, store) = create_test_app();
        seed(&store);

        for uri in ["/users/1/avg", "/locations/10/visits", "/visits/100/avg", "/users/x/visits"] {
            let response = send(&app, "GET", uri, "").await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "GET {uri}");
        }
    }

    #[tokio::test]
    async fn test_post_missing_fields_no_partial_insert() {
        let (app, _store) = create_test_app();

        let response = send(&app, "POST", "/visits/new", r#"{"id": 7, "user": 1}"#).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[header::CONNECTION], "close");
        assert_eq!(body_string(response).await, "{}");

        let response = send(&app, "GET", "/visits/7", "").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_post_validation_and_duplicates() {
        let (app, store) = create_test_app();
        seed(&store);

        let too_old = r#"{"id":2,"email":"a@b.c","first_name":"A","last_name":"B","gender":"m","birth_date":-1300000000}"#;
        let response = send(&app, "POST", "/users/new", too_old).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bad_gender = r#"{"id":2,"email":"a@b.c","first_name":"A","last_name":"B","gender":"x","birth_date":0}"#;
        let response = send(&app, "POST", "/users/new", bad_gender).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let null_field = r#"{"id":11,"place":null,"country":"C","city":"X","distance":1}"#;
        let response = send(&app, "POST", "/locations/new", null_field).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let duplicate = r#"{"id":10,"place":"P","country":"C","city":"X","distance":1}"#;
        let response = send(&app, "POST", "/locations/new", duplicate).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(store.get_location(10).unwrap().place, "Museum");

        let response = send(&app, "POST", "/users/new", "not json").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_post_visit_updates_aggregates() {
        let (app, store) = create_test_app();
        seed(&store);

        let visit = r#"{"id":103,"location":10,"user":1,"visited_at":1200000000,"mark":0}"#;
        let response = send(&app, "POST", "/visits/new", visit).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app, "GET", "/locations/10/avg", "").await;
        assert_eq!(body_string(response).await, r#"{"avg": 3.00000}"#);

        let response = send(&app, "GET", "/users/1/visits", "").await;
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["visits"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_post_not_found_cases() {
        let (app, store) = create_test_app();
        seed(&store);
        let location = r#"{"id":10,"place":"Changed","country":"C","city":"X","distance":1}"#;

        for uri in ["/widgets/new", "/locations/10", "/locations/10/avg", "/new"] {
            let response = send(&app, "POST", uri, location).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "POST {uri}");
            assert_eq!(response.headers()[header::CONNECTION], "close");
        }
        assert_eq!(store.get_location(10).unwrap().place, "Museum");
    }

    #[tokio::test]
    async fn test_other_methods_not_allowed() {
        let (app, store) = create_test_app();
        seed(&store);

        for (method, uri) in [
            ("PUT", "/users/1"),
            ("DELETE", "/users/1"),
            ("PATCH", "/users/1/visits"),
            ("DELETE", "/anything/else/at/all"),
        ] {
            let response = send(&app, method, uri, "").await;
            assert_eq!(
                response.status(),
                StatusCode::METHOD_NOT_ALLOWED,
                "{method} {uri}"
            );
        }
    }

    #[tokio::test]
    async fn test_undecodable_path_is_not_found() {
        let (app, store) = create_test_app();
        seed(&store);

        for uri in ["/users/%FF", "/%FF/1", "/users/%FF/visits", "/locations/10/%FF"] {
            let response = send(&app, "GET", uri, "").await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "GET {uri}");
            assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
            assert_eq!(body_string(response).await, "{}");
        }

        for uri in ["/users/%FF", "/%FF/new"] {
            let response = send(&app, "POST", uri, "{}").await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "POST {uri}");
            assert_eq!(response.headers()[header::CONNECTION], "close");
            assert_eq!(body_string(response).await, "{}");
        }
    }

    #[tokio::test]
    async fn test_large_body_within_limit() {
        let (app, _store) = create_test_app();
        let place = "x".repeat(3 * 1024 * 1024);
        let location = format!(
            r#"{{"id":1,"place":"{}","country":"C","city":"X","distance":1}}"#,
            place
        );

        let response = send(&app, "POST", "/locations/new", &location).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "{}");

        let response = send(&app, "GET", "/locations/1", "").await;
        let body: Location = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body.place.len(), place.len());
    }

    #[tokio::test]
    async fn test_body_over_limit_is_bad_request() {
        let store = Arc::new(EntityStore::default());
        let config = ApiConfig {
            max_body_size: 64,
            ..ApiConfig::default()
        };
        let app = build_router(AppState::new(Arc::clone(&store), config));
        let location = format!(
            r#"{{"id":1,"place":"{}","country":"C","city":"X","distance":1}}"#,
            "x".repeat(100)
        );

        let response = send(&app, "POST", "/locations/new", &location).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[header::CONNECTION], "close");
        assert_eq!(body_string(response).await, "{}");
        assert!(store.get_location(1).is_none());

        // The path is checked before the body is read
        let response = send(&app, "POST", "/widgets/new", &location).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_head_not_allowed() {
        let (app, store) = create_test_app();
        seed(&store);

        for uri in ["/users/1", "/users/1/visits", "/locations/10/avg", "/nowhere"] {
            let response = send(&app, "HEAD", uri, "").await;
            assert_eq!(
                response.status(),
                StatusCode::METHOD_NOT_ALLOWED,
                "HEAD {uri}"
            );
        }
    }

    #[tokio::test]
    async fn test_requests_are_counted() {
        let store = Arc::new(EntityStore::default());
        let state = AppState::new(store, ApiConfig::default());
        let requests = Arc::clone(&state.requests);
        let app = build_router(state);

        send(&app, "GET", "/users/1", "").await;
        send(&app, "GET", "/nowhere", "").await;
        assert_eq!(requests.total(), 2);
    }

    #[tokio::test]
    async fn test_access_log_router_serves() {
        let store = Arc::new(EntityStore::default());
        let config = ApiConfig {
            access_log: true,
            ..ApiConfig::default()
        };
        let app = build_router(AppState::new(store, config));

        let response = send(&app, "GET", "/users/1", "").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
