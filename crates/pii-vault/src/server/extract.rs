//! Caller identity extraction from the trusted gateway headers.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderName},
    response::Response,
};
use common::ServiceError;

use super::handlers::error_response;
use super::state::AppState;
use crate::disclosure::{Caller, Role};

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = |name: &HeaderName| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };

        let Some(subject) = header(&state.identity.subject) else {
            return Err(error_response(ServiceError::Unauthenticated(format!(
                "missing {} header",
                state.identity.subject
            ))));
        };
        // Absent or unrecognised claims get the least-privileged role.
        let role = header(&state.identity.role).map_or(Role::Client, Role::from_claim);

        Ok(Caller::new(subject, role))
    }
}
