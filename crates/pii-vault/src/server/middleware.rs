//! Axum middleware layers applied to the router.
//!
//! Includes request tracing, timeout enforcement, response compression, and
//! the `Cache-Control: no-store` header on sensitive routes.

use std::time::Duration;

use axum::http::{header, HeaderValue};
use tower_http::set_header::SetResponseHeaderLayer;

/// Default per-request timeout applied to all routes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Forbid caches and intermediaries from keeping `/pii` responses.
pub fn no_store() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(header::CACHE_CONTROL, HeaderValue::from_static("no-store"))
}
