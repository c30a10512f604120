//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::BadRequest`] → 400
/// - [`ServiceError::Unauthenticated`] → 401
/// - [`ServiceError::Forbidden`] → 403
/// - [`ServiceError::DecryptionFailure`] → 500
/// - [`ServiceError::Misconfigured`] → 500
/// - [`ServiceError::Internal`] → 500
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was malformed or failed field validation. The message is
    /// safe to show to the end user.
    #[error("{0}")]
    BadRequest(String),

    /// The upstream gateway did not supply a caller identity.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// The caller may not act on the requested record.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Stored ciphertext could not be authenticated or parsed.
    #[error("could not decrypt stored value")]
    DecryptionFailure,

    /// Key material for a vault is missing or malformed.
    #[error("service misconfigured: {0}")]
    Misconfigured(String),

    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::Unauthenticated(_) => 401,
            ServiceError::Forbidden(_) => 403,
            ServiceError::DecryptionFailure => 500,
            ServiceError::Misconfigured(_) => 500,
            ServiceError::Internal(_) => 500,
        }
    }

    /// Short machine-readable code used in [`crate::protocol::ErrorResponse`].
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "validation_failed",
            ServiceError::Unauthenticated(_) => "unauthenticated",
            ServiceError::Forbidden(_) => "forbidden",
            ServiceError::DecryptionFailure => "decryption_failed",
            ServiceError::Misconfigured(_) => "misconfigured",
            ServiceError::Internal(_) => "internal_error",
        }
    }

    /// Message exposed to callers.
    ///
    /// Server-side failures collapse to a generic sentence; only client
    /// errors carry their detail.
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::BadRequest(m)
            | ServiceError::Unauthenticated(m)
            | ServiceError::Forbidden(m) => m.clone(),
            ServiceError::DecryptionFailure => "could not decrypt stored value".into(),
            ServiceError::Misconfigured(_) | ServiceError::Internal(_) => {
                "internal server error".into()
            }
        }
    }
}
