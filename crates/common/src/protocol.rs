//! Request and response types exchanged with the portal UI.
//!
//! All bodies are JSON with camelCase field names. Full sensitive values
//! (`ssn`, `routingNumber`, `accountNumber`) are optional and omitted from the
//! serialised body unless the disclosure gate approved a reveal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Returns `true` when a `reveal` query value asks for full disclosure.
///
/// Accepts `1` and `true` (any case); everything else, including absence,
/// means masked.
pub fn reveal_requested(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some(v) if v == "1" || v.eq_ignore_ascii_case("true"))
}

/// Query string for `GET /pii/ssn`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsnQuery {
    /// Dependent whose SSN is requested.
    pub dependent_id: Option<String>,
    /// `1` to request the full value.
    pub reveal: Option<String>,
}

/// Query string for the direct-deposit endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectDepositQuery {
    /// Target user. Defaults to the caller; only staff may name another user.
    pub user_id: Option<String>,
    /// `1` to request the full numbers.
    pub reveal: Option<String>,
}

// ---------------------------------------------------------------------------
// SSN endpoints
// ---------------------------------------------------------------------------

/// Response body for `GET /pii/ssn`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsnResponse {
    pub has_ssn: bool,
    pub last4: String,
    pub applied_but_not_received: bool,
    /// Masked display string, e.g. `•••-••-1234`.
    pub masked: String,
    /// Full dashed SSN. Present only on an approved reveal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssn: Option<String>,
}

/// Request body for `POST /pii/ssn`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsnWriteRequest {
    pub dependent_id: String,
    #[serde(default)]
    pub ssn: Option<String>,
    #[serde(default)]
    pub applied_but_not_received: Option<bool>,
}

/// Acknowledgement body for successful writes that return no data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

// ---------------------------------------------------------------------------
// Direct deposit endpoints
// ---------------------------------------------------------------------------

/// Bank account type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    #[default]
    Checking,
    Savings,
}

/// Response body for `GET` and `POST /pii/direct-deposit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectDepositResponse {
    pub use_direct_deposit: bool,
    pub account_holder_name: String,
    pub bank_name: String,
    pub account_type: AccountType,
    pub routing_last4: String,
    pub account_last4: String,
    pub has_numbers_on_file: bool,
    pub updated_at: Option<DateTime<Utc>>,
    /// Masked routing display, e.g. `Routing ****0021`. Empty when none on file.
    pub routing_display: String,
    /// Masked account display, e.g. `Account ****5678`. Empty when none on file.
    pub account_display: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
}

/// Request body for `POST /pii/direct-deposit`.
///
/// Number fields may contain spaces or dashes; they are reduced to digits
/// server-side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectDepositWriteRequest {
    pub use_direct_deposit: bool,
    #[serde(default)]
    pub account_holder_name: String,
    #[serde(default)]
    pub bank_name: String,
    #[serde(default)]
    pub account_type: AccountType,
    #[serde(default)]
    pub routing_number: String,
    #[serde(default)]
    pub account_number: String,
    #[serde(default)]
    pub confirm_account_number: Option<String>,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"validation_failed"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&crate::ServiceError> for ErrorResponse {
    fn from(err: &crate::ServiceError) -> Self {
        Self::new(err.code(), err.public_message())
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Overall service status. Always `"ok"` while the process serves requests.
    pub status: String,
    /// Whether the SSN vault key has been decoded yet.
    pub ssn_key_loaded: bool,
    /// Whether the banking vault key has been decoded yet.
    pub bank_key_loaded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reveal_flag_parsing() {
        assert!(reveal_requested(Some("1")));
        assert!(reveal_requested(Some("TRUE")));
        assert!(!reveal_requested(Some("0")));
        assert!(!reveal_requested(Some("yes")));
        assert!(!reveal_requested(None));
    }

    #[test]
    fn ssn_response_omits_unrevealed_value() {
        let resp = SsnResponse {
            has_ssn: true,
            last4: "6789".into(),
            applied_but_not_received: false,
            masked: "•••-••-6789".into(),
            ssn: None,
        };
        let v = serde_json::to_value(&resp).unwrap();
        assert_eq!(v["hasSsn"], true);
        assert!(v.get("ssn").is_none());
    }

    #[test]
    fn direct_deposit_request_defaults() {
        let req: DirectDepositWriteRequest =
            serde_json::from_value(json!({"useDirectDeposit": true})).unwrap();
        assert!(req.use_direct_deposit);
        assert!(req.routing_number.is_empty());
        assert_eq!(req.account_type, AccountType::Checking);
        assert!(req.confirm_account_number.is_none());
    }

    #[test]
    fn account_type_is_lowercase() {
        assert_eq!(serde_json::to_value(AccountType::Savings).unwrap(), "savings");
    }

    #[test]
    fn error_response_from_service_error() {
        let e = crate::ServiceError::BadRequest("no numbers on file".into());
        let body = ErrorResponse::from(&e);
        assert_eq!(body.code, "validation_failed");
        assert_eq!(body.message, "no numbers on file");
    }
}
