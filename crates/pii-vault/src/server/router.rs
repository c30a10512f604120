//! Axum router construction.

use std::time::Duration;

use axum::{routing::get, Router};
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use super::{handlers, middleware, state::AppState};

/// Build the application [`Router`] with all routes and middleware attached.
pub fn build(state: AppState, request_timeout: Duration) -> Router {
    let pii = Router::new()
        .route(
            "/pii/ssn",
            get(handlers::read_ssn).post(handlers::write_ssn),
        )
        .route(
            "/pii/direct-deposit",
            get(handlers::read_direct_deposit).post(handlers::write_direct_deposit),
        )
        .layer(middleware::no_store());

    Router::new()
        .merge(pii)
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CompressionLayer::new())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{KeyCell, KeyMaterial, KEY_LEN};
    use crate::server::state::IdentityHeaders;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    fn app() -> Router {
        let key = || KeyCell::fixed(KeyMaterial::from_bytes([0x33; KEY_LEN]));
        let state = AppState::in_memory(key(), key(), IdentityHeaders::default());
        build(state, middleware::REQUEST_TIMEOUT)
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let req = Request::builder()
            .uri("/unknown")
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_route_exists() {
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get(header::CACHE_CONTROL).is_none());
    }

    #[tokio::test]
    async fn pii_routes_are_not_cacheable() {
        let req = Request::builder()
            .uri("/pii/ssn?dependentId=d-1")
            .header("x-subject-id", "u-1")
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CACHE_CONTROL], "no-store");
    }

    #[tokio::test]
    async fn pii_errors_are_not_cacheable_either() {
        let req = Request::builder()
            .uri("/pii/direct-deposit")
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(resp.headers()[header::CACHE_CONTROL], "no-store");
    }

    #[tokio::test]
    async fn ssn_post_requires_json_body() {
        let req = Request::builder()
            .method("POST")
            .uri("/pii/ssn")
            .header("x-subject-id", "u-1")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
