//! Axum request handlers for all service endpoints.

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::protocol::{
    reveal_requested, DirectDepositQuery, DirectDepositResponse, DirectDepositWriteRequest,
    ErrorResponse, HealthResponse, OkResponse, SsnQuery, SsnResponse, SsnWriteRequest,
};
use common::ServiceError;
use tracing::{error, warn};

use super::state::AppState;
use crate::disclosure::{Caller, Resource};
use crate::fields::mask;
use crate::vault::{DirectDepositView, SsnView, SsnWrite, VaultError};

/// Render a [`ServiceError`] as its status code and JSON body.
///
/// 500-class errors are logged here with their internal detail; the body only
/// carries the generic public message.
pub(crate) fn error_response(err: ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(code = err.code(), error = %err, "request failed");
    }
    (status, Json(ErrorResponse::from(&err))).into_response()
}

fn bad_request(message: impl Into<String>) -> Response {
    error_response(ServiceError::BadRequest(message.into()))
}

/// `GET /pii/ssn?dependentId=…&reveal=1`: a dependent's SSN, masked unless
/// the caller may and did ask to reveal it.
pub async fn read_ssn(
    State(state): State<AppState>,
    caller: Caller,
    query: Result<Query<SsnQuery>, QueryRejection>,
) -> Response {
    let Query(q) = match query {
        Ok(q) => q,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    let Some(dependent_id) = q
        .dependent_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    else {
        return bad_request("dependentId is required");
    };

    let disclosure = state.gate.decide(
        &caller,
        reveal_requested(q.reveal.as_deref()),
        Resource::Ssn,
        dependent_id,
    );
    match state.ssn.read(dependent_id, disclosure).await {
        Ok(view) => (StatusCode::OK, Json(SsnResponse::from(view))).into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// `POST /pii/ssn`: store an SSN, or record that one was applied for.
pub async fn write_ssn(
    State(state): State<AppState>,
    _caller: Caller,
    body: Result<Json<SsnWriteRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(b) => b,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    let write = SsnWrite {
        ssn: req.ssn,
        applied_but_not_received: req.applied_but_not_received,
    };
    match state.ssn.write(&req.dependent_id, write).await {
        Ok(()) => (StatusCode::OK, Json(OkResponse::ok())).into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// `GET /pii/direct-deposit?userId=…&reveal=1`
pub async fn read_direct_deposit(
    State(state): State<AppState>,
    caller: Caller,
    query: Result<Query<DirectDepositQuery>, QueryRejection>,
) -> Response {
    let Query(q) = match query {
        Ok(q) => q,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    let user_id = match target_user(&caller, q.user_id.as_deref()) {
        Ok(id) => id,
        Err(e) => return error_response(e.into()),
    };

    let disclosure = state.gate.decide(
        &caller,
        reveal_requested(q.reveal.as_deref()),
        Resource::DirectDeposit,
        user_id,
    );
    match state.direct_deposit.read(user_id, disclosure).await {
        Ok(view) => (StatusCode::OK, Json(DirectDepositResponse::from(view))).into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// `POST /pii/direct-deposit?userId=…`: enable, disable, or save banking
/// details. Always answers with masked values.
pub async fn write_direct_deposit(
    State(state): State<AppState>,
    caller: Caller,
    query: Result<Query<DirectDepositQuery>, QueryRejection>,
    body: Result<Json<DirectDepositWriteRequest>, JsonRejection>,
) -> Response {
    let Query(q) = match query {
        Ok(q) => q,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    let Json(req) = match body {
        Ok(b) => b,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    let user_id = match target_user(&caller, q.user_id.as_deref()) {
        Ok(id) => id,
        Err(e) => return error_response(e.into()),
    };

    match state.direct_deposit.write(user_id, &req).await {
        Ok(view) => (StatusCode::OK, Json(DirectDepositResponse::from(view))).into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// `GET /health`: liveness, plus whether each vault key has been loaded.
///
/// Keys load lazily on first use, so `false` is not a failure.
pub async fn health(State(state): State<AppState>) -> Response {
    let body = HealthResponse {
        status: "ok".into(),
        ssn_key_loaded: state.ssn.envelope().key().is_loaded(),
        bank_key_loaded: state.direct_deposit.envelope().key().is_loaded(),
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

/// The user a direct-deposit request acts on. Defaults to the caller; only
/// staff may name someone else.
fn target_user<'a>(caller: &'a Caller, requested: Option<&'a str>) -> Result<&'a str, VaultError> {
    match requested.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(&caller.subject_id),
        Some(id) if id == caller.subject_id || caller.role.is_staff() => Ok(id),
        Some(_) => {
            warn!(
                subject = %caller.subject_id,
                role = %caller.role,
                "cross-user banking access denied"
            );
            Err(VaultError::Authorization(
                "cannot access another user's banking details".into(),
            ))
        }
    }
}

impl From<SsnView> for SsnResponse {
    fn from(view: SsnView) -> Self {
        Self {
            masked: view.masked(),
            has_ssn: view.has_ssn,
            last4: view.last4,
            applied_but_not_received: view.applied_but_not_received,
            ssn: view.full,
        }
    }
}

impl From<DirectDepositView> for DirectDepositResponse {
    fn from(view: DirectDepositView) -> Self {
        Self {
            routing_display: mask::masked_routing(&view.routing_last4),
            account_display: mask::masked_account(&view.account_last4),
            use_direct_deposit: view.use_direct_deposit,
            account_holder_name: view.account_holder_name,
            bank_name: view.bank_name,
            account_type: view.account_type,
            routing_last4: view.routing_last4,
            account_last4: view.account_last4,
            has_numbers_on_file: view.has_numbers_on_file,
            updated_at: view.updated_at,
            routing_number: view.routing_number,
            account_number: view.account_number,
        }
    }
}
