//! Disclosure Gate: the one place that decides whether a request may receive
//! decrypted sensitive values.
//!
//! A denied reveal is not an error. The caller receives the same masked
//! response it would get without asking, so responses cannot be used to probe
//! which accounts hold elevated access. Every granted reveal emits a single
//! structured `pii.reveal` event carrying a fresh reveal id; durable audit
//! storage hooks in here.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

/// Role claim supplied by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Client,
    Preparer,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Parse a role claim. Unrecognised claims get the least privilege.
    pub fn from_claim(claim: &str) -> Self {
        match claim.trim().to_ascii_uppercase().as_str() {
            "SUPERADMIN" => Role::SuperAdmin,
            "ADMIN" => Role::Admin,
            "PREPARER" => Role::Preparer,
            _ => Role::Client,
        }
    }

    /// Staff roles may act on records belonging to other users.
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Preparer | Role::Admin | Role::SuperAdmin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Client => "CLIENT",
            Role::Preparer => "PREPARER",
            Role::Admin => "ADMIN",
            Role::SuperAdmin => "SUPERADMIN",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reveal policy: only the two highest administrative roles see full values.
pub fn can_reveal(role: Role) -> bool {
    matches!(role, Role::Admin | Role::SuperAdmin)
}

/// Authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub subject_id: String,
    pub role: Role,
}

impl Caller {
    pub fn new(subject_id: impl Into<String>, role: Role) -> Self {
        Self {
            subject_id: subject_id.into(),
            role,
        }
    }
}

/// Outcome of a disclosure decision for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disclosure {
    /// Return masked values only.
    Masked,
    /// Return decrypted values; `reveal_id` identifies the audit event.
    Full { reveal_id: Uuid },
}

impl Disclosure {
    pub fn is_full(&self) -> bool {
        matches!(self, Disclosure::Full { .. })
    }
}

/// Sensitive resource kinds, used in audit events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Ssn,
    DirectDeposit,
}

impl Resource {
    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Ssn => "ssn",
            Resource::DirectDeposit => "direct_deposit",
        }
    }
}

/// Request-time reveal authorisation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisclosureGate;

impl DisclosureGate {
    pub fn new() -> Self {
        Self
    }

    /// Decide what `caller` may see of `record_id`.
    ///
    /// Full disclosure requires both an explicit reveal request and a role
    /// passing [`can_reveal`].
    pub fn decide(
        &self,
        caller: &Caller,
        reveal_requested: bool,
        resource: Resource,
        record_id: &str,
    ) -> Disclosure {
        if !reveal_requested {
            return Disclosure::Masked;
        }
        if !can_reveal(caller.role) {
            debug!(
                subject = %caller.subject_id,
                role = %caller.role,
                resource = resource.as_str(),
                "reveal denied; serving masked values"
            );
            return Disclosure::Masked;
        }

        let reveal_id = Uuid::new_v4();
        info!(
            event = "pii.reveal",
            reveal_id = %reveal_id,
            subject = %caller.subject_id,
            role = %caller.role,
            resource = resource.as_str(),
            record = %record_id,
            "sensitive value revealed"
        );
        Disclosure::Full { reveal_id }
    }
}
