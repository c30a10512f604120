//! [`VaultError`]: the failure taxonomy shared by both vaults.

use common::ServiceError;
use thiserror::Error;

use super::store::StoreError;
use crate::crypto::{CipherError, EnvelopeError};
use crate::fields::ValidationError;
use crate::keys::KeyError;

#[derive(Debug, Error)]
pub enum VaultError {
    /// Key material is missing or malformed. Fatal to the vault, never retried.
    #[error("vault key unavailable: {0}")]
    Config(#[from] KeyError),

    /// Bad input shape. The message is safe to show the end user.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Stored ciphertext failed authentication or could not be parsed.
    #[error("could not decrypt stored value: {0}")]
    Crypto(#[from] CipherError),

    /// The caller may not act on the requested record.
    #[error("forbidden: {0}")]
    Authorization(String),

    /// The row store failed.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl From<EnvelopeError> for VaultError {
    fn from(e: EnvelopeError) -> Self {
        match e {
            EnvelopeError::Key(k) => VaultError::Config(k),
            EnvelopeError::Cipher(c) => VaultError::Crypto(c),
        }
    }
}

impl From<VaultError> for ServiceError {
    fn from(e: VaultError) -> Self {
        match e {
            VaultError::Config(k) => ServiceError::Misconfigured(k.to_string()),
            VaultError::Validation(v) => ServiceError::BadRequest(v.to_string()),
            VaultError::Crypto(_) => ServiceError::DecryptionFailure,
            VaultError::Authorization(m) => ServiceError::Forbidden(m),
            VaultError::Storage(s) => ServiceError::Internal(s.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400_with_message() {
        let e: ServiceError =
            VaultError::from(ValidationError::new("Account numbers do not match")).into();
        assert_eq!(e.http_status(), 400);
        assert_eq!(e.public_message(), "Account numbers do not match");
    }

    #[test]
    fn crypto_maps_to_generic_500() {
        let e: ServiceError = VaultError::from(CipherError::AuthenticationFailed).into();
        assert_eq!(e.http_status(), 500);
        assert_eq!(e.code(), "decryption_failed");
    }

    #[test]
    fn envelope_errors_split_by_cause() {
        let key = VaultError::from(EnvelopeError::Key(KeyError::Missing("K".into())));
        assert!(matches!(key, VaultError::Config(_)));
        let cipher = VaultError::from(EnvelopeError::Cipher(CipherError::InvalidFormat));
        assert!(matches!(cipher, VaultError::Crypto(_)));
    }

    #[test]
    fn config_error_hides_detail_from_callers() {
        let e: ServiceError =
            VaultError::Config(KeyError::Missing("SSN_ENCRYPTION_KEY".into())).into();
        assert_eq!(e.http_status(), 500);
        assert!(!e.public_message().contains("SSN_ENCRYPTION_KEY"));
    }
}
