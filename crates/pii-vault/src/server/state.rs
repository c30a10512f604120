//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::HeaderName;

use crate::crypto::Envelope;
use crate::disclosure::DisclosureGate;
use crate::keys::KeyCell;
use crate::vault::{DirectDepositVault, MemoryStore, SsnVault};

/// Default header carrying the authenticated subject id.
pub const DEFAULT_SUBJECT_HEADER: &str = "x-subject-id";

/// Default header carrying the identity provider's role claim.
pub const DEFAULT_ROLE_HEADER: &str = "x-subject-role";

/// Names of the trusted identity headers set by the upstream gateway.
#[derive(Debug, Clone)]
pub struct IdentityHeaders {
    pub subject: HeaderName,
    pub role: HeaderName,
}

impl IdentityHeaders {
    /// Parse configured header names.
    ///
    /// # Errors
    ///
    /// Returns an error if either name is not a valid HTTP header name.
    pub fn new(subject: &str, role: &str) -> Result<Self> {
        Ok(Self {
            subject: HeaderName::try_from(subject)
                .with_context(|| format!("invalid subject header name: {subject:?}"))?,
            role: HeaderName::try_from(role)
                .with_context(|| format!("invalid role header name: {role:?}"))?,
        })
    }
}

impl Default for IdentityHeaders {
    fn default() -> Self {
        Self {
            subject: HeaderName::from_static(DEFAULT_SUBJECT_HEADER),
            role: HeaderName::from_static(DEFAULT_ROLE_HEADER),
        }
    }
}

/// Application state shared across all request handlers.
///
/// All fields are cheaply cloneable (`Arc`-wrapped or `Copy`) so that Axum can
/// clone the state for each request without copying expensive data.
#[derive(Clone)]
pub struct AppState {
    pub ssn: Arc<SsnVault>,
    pub direct_deposit: Arc<DirectDepositVault>,
    pub gate: DisclosureGate,
    pub identity: Arc<IdentityHeaders>,
}

impl AppState {
    pub fn new(ssn: SsnVault, direct_deposit: DirectDepositVault, identity: IdentityHeaders) -> Self {
        Self {
            ssn: Arc::new(ssn),
            direct_deposit: Arc::new(direct_deposit),
            gate: DisclosureGate::new(),
            identity: Arc::new(identity),
        }
    }

    /// Both vaults over one shared [`MemoryStore`].
    pub fn in_memory(ssn_key: KeyCell, bank_key: KeyCell, identity: IdentityHeaders) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(
            SsnVault::new(Envelope::new(ssn_key), store.clone()),
            DirectDepositVault::new(Envelope::new(bank_key), store),
            identity,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_identity_headers() {
        let h = IdentityHeaders::default();
        assert_eq!(h.subject.as_str(), "x-subject-id");
        assert_eq!(h.role.as_str(), "x-subject-role");
    }

    #[test]
    fn configured_header_names_are_normalised() {
        let h = IdentityHeaders::new("X-Auth-User", "X-Auth-Role").unwrap();
        assert_eq!(h.subject.as_str(), "x-auth-user");
    }

    #[test]
    fn invalid_header_name_rejected() {
        assert!(IdentityHeaders::new("bad header", "x-role").is_err());
    }
}
