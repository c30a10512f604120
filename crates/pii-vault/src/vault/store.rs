//! Row-store interface for vault records.
//!
//! The storage engine is an external collaborator. Each trait exposes a read
//! and a single atomic upsert keyed by the record's natural key; a SQL
//! implementation maps every [`SsnChange`] / [`DirectDepositChange`] onto one
//! `INSERT ... ON CONFLICT ... DO UPDATE` (or a conditional `UPDATE` for
//! [`DirectDepositChange::EnableExisting`]), never a read-then-write.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::protocol::AccountType;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::EncryptedBlob;

/// Errors surfaced by a row store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not complete the operation.
    #[error("row store unavailable: {0}")]
    Unavailable(String),
}

// ---------------------------------------------------------------------------
// SSN
// ---------------------------------------------------------------------------

/// Encrypted SSN state for one dependent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsnRecord {
    pub dependent_id: String,
    pub ssn_encrypted: Option<EncryptedBlob>,
    pub applied_but_not_received: bool,
    pub updated_at: DateTime<Utc>,
}

/// One atomic mutation of an [`SsnRecord`].
#[derive(Debug, Clone, PartialEq)]
pub enum SsnChange {
    /// Store a new SSN and clear the applied-for flag.
    Store(EncryptedBlob),
    /// Mark the SSN as applied for and drop any stored value.
    MarkApplied,
    /// Clear the applied-for flag, keeping any stored value.
    ClearApplied,
}

impl SsnChange {
    pub fn kind(&self) -> &'static str {
        match self {
            SsnChange::Store(_) => "store",
            SsnChange::MarkApplied => "mark_applied",
            SsnChange::ClearApplied => "clear_applied",
        }
    }
}

impl SsnRecord {
    /// A fresh record with nothing on file.
    pub fn empty(dependent_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            dependent_id: dependent_id.to_owned(),
            ssn_encrypted: None,
            applied_but_not_received: false,
            updated_at: now,
        }
    }

    /// Apply `change` in place.
    pub fn apply(&mut self, change: SsnChange, now: DateTime<Utc>) {
        match change {
            SsnChange::Store(blob) => {
                self.ssn_encrypted = Some(blob);
                self.applied_but_not_received = false;
            }
            SsnChange::MarkApplied => {
                self.ssn_encrypted = None;
                self.applied_but_not_received = true;
            }
            SsnChange::ClearApplied => {
                self.applied_but_not_received = false;
            }
        }
        self.updated_at = now;
    }
}

/// Storage for [`SsnRecord`]s, keyed by dependent id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SsnStore: Send + Sync {
    /// Load the record for `dependent_id`, if any.
    async fn get(&self, dependent_id: &str) -> Result<Option<SsnRecord>, StoreError>;

    /// Atomically create or update the record and return its new state.
    async fn upsert(&self, dependent_id: &str, change: SsnChange)
        -> Result<SsnRecord, StoreError>;
}

// ---------------------------------------------------------------------------
// Direct deposit
// ---------------------------------------------------------------------------

/// Banking details for one user. At most one row per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectDepositRecord {
    pub user_id: String,
    pub use_direct_deposit: bool,
    pub account_holder_name: String,
    pub bank_name: String,
    pub account_type: AccountType,
    pub routing_last4: String,
    pub account_last4: String,
    pub routing_encrypted: Option<EncryptedBlob>,
    pub account_encrypted: Option<EncryptedBlob>,
    pub updated_at: DateTime<Utc>,
}

/// Validated, encrypted banking details for a full save.
#[derive(Debug, Clone, PartialEq)]
pub struct BankDetails {
    pub account_holder_name: String,
    pub bank_name: String,
    pub account_type: AccountType,
    pub routing_last4: String,
    pub account_last4: String,
    pub routing_encrypted: EncryptedBlob,
    pub account_encrypted: EncryptedBlob,
}

/// One atomic mutation of a [`DirectDepositRecord`].
#[derive(Debug, Clone, PartialEq)]
pub enum DirectDepositChange {
    /// Turn direct deposit on, only if numbers are already on file.
    EnableExisting,
    /// Turn direct deposit off and scrub every field.
    Disable,
    /// Replace all details and turn direct deposit on.
    Save(BankDetails),
}

impl DirectDepositChange {
    pub fn kind(&self) -> &'static str {
        match self {
            DirectDepositChange::EnableExisting => "enable",
            DirectDepositChange::Disable => "disable",
            DirectDepositChange::Save(_) => "save",
        }
    }
}

impl DirectDepositRecord {
    /// The scrubbed, disabled state.
    pub fn empty(user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_owned(),
            use_direct_deposit: false,
            account_holder_name: String::new(),
            bank_name: String::new(),
            account_type: AccountType::Checking,
            routing_last4: String::new(),
            account_last4: String::new(),
            routing_encrypted: None,
            account_encrypted: None,
            updated_at: now,
        }
    }

    /// Any encrypted number or fingerprint is present.
    pub fn has_numbers_on_file(&self) -> bool {
        self.routing_encrypted.is_some()
            || self.account_encrypted.is_some()
            || !self.routing_last4.is_empty()
            || !self.account_last4.is_empty()
    }

    /// Apply `change` in place.
    ///
    /// Returns `false`, leaving the record untouched, when
    /// [`DirectDepositChange::EnableExisting`] finds no numbers on file.
    pub fn apply(&mut self, change: DirectDepositChange, now: DateTime<Utc>) -> bool {
        match change {
            DirectDepositChange::EnableExisting => {
                if !self.has_numbers_on_file() {
                    return false;
                }
                self.use_direct_deposit = true;
            }
            DirectDepositChange::Disable => {
                let user_id = std::mem::take(&mut self.user_id);
                *self = Self::empty(&user_id, now);
            }
            DirectDepositChange::Save(details) => {
                self.use_direct_deposit = true;
                self.account_holder_name = details.account_holder_name;
                self.bank_name = details.bank_name;
                self.account_type = details.account_type;
                self.routing_last4 = details.routing_last4;
                self.account_last4 = details.account_last4;
                self.routing_encrypted = Some(details.routing_encrypted);
                self.account_encrypted = Some(details.account_encrypted);
            }
        }
        self.updated_at = now;
        true
    }
}

/// Storage for [`DirectDepositRecord`]s, keyed by user id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectDepositStore: Send + Sync {
    /// Load the row for `user_id`, if any.
    async fn get(&self, user_id: &str) -> Result<Option<DirectDepositRecord>, StoreError>;

    /// Atomically create or update the row and return its new state.
    ///
    /// Returns `Ok(None)` only for [`DirectDepositChange::EnableExisting`]
    /// when no numbers are on file; nothing is written in that case.
    async fn upsert(
        &self,
        user_id: &str,
        change: DirectDepositChange,
    ) -> Result<Option<DirectDepositRecord>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::cipher::{NONCE_LEN, TAG_LEN};

    fn blob(byte: u8) -> EncryptedBlob {
        EncryptedBlob::V1Gcm {
            nonce: [byte; NONCE_LEN],
            tag: [byte; TAG_LEN],
            ciphertext: vec![byte; 9],
        }
    }

    fn details() -> BankDetails {
        BankDetails {
            account_holder_name: "Pat Doe".into(),
            bank_name: "First Bank".into(),
            account_type: AccountType::Savings,
            routing_last4: "0021".into(),
            account_last4: "5678".into(),
            routing_encrypted: blob(1),
            account_encrypted: blob(2),
        }
    }

    #[test]
    fn marking_applied_clears_ssn() {
        let now = Utc::now();
        let mut rec = SsnRecord::empty("d-1", now);
        rec.apply(SsnChange::Store(blob(3)), now);
        assert!(rec.ssn_encrypted.is_some());
        rec.apply(SsnChange::MarkApplied, now);
        assert!(rec.ssn_encrypted.is_none());
        assert!(rec.applied_but_not_received);
    }

    #[test]
    fn ssn_record_persists_blob_as_string() {
        let now = Utc::now();
        let mut rec = SsnRecord::empty("d-1", now);
        rec.apply(SsnChange::Store(blob(3)), now);

        let row = serde_json::to_value(&rec).unwrap();
        assert_eq!(row["dependentId"], "d-1");
        assert_eq!(row["ssnEncrypted"], blob(3).to_string());

        let back: SsnRecord = serde_json::from_value(row).unwrap();
        assert_eq!(back, rec);
    }

    #[test]
    fn direct_deposit_record_persists_blobs_as_strings() {
        let now = Utc::now();
        let mut rec = DirectDepositRecord::empty("u-1", now);
        rec.apply(DirectDepositChange::Save(details()), now);

        let row = serde_json::to_value(&rec).unwrap();
        assert_eq!(row["accountType"], "savings");
        assert!(row["routingEncrypted"].as_str().unwrap().starts_with("v1."));
        assert_eq!(row["accountEncrypted"], blob(2).to_string());

        let back: DirectDepositRecord = serde_json::from_value(row).unwrap();
        assert_eq!(back, rec);
    }

    #[test]
    fn storing_ssn_clears_applied() {
        let now = Utc::now();
        let mut rec = SsnRecord::empty("d-1", now);
        rec.apply(SsnChange::MarkApplied, now);
        rec.apply(SsnChange::Store(blob(3)), now);
        assert!(!rec.applied_but_not_received);
    }

    #[test]
    fn clear_applied_keeps_ssn() {
        let now = Utc::now();
        let mut rec = SsnRecord::empty("d-1", now);
        rec.apply(SsnChange::Store(blob(3)), now);
        rec.apply(SsnChange::ClearApplied, now);
        assert_eq!(rec.ssn_encrypted, Some(blob(3)));
    }

    #[test]
    fn enable_requires_numbers() {
        let now = Utc::now();
        let mut rec = DirectDepositRecord::empty("u-1", now);
        assert!(!rec.apply(DirectDepositChange::EnableExisting, now));
        assert!(!rec.use_direct_deposit);
    }

    #[test]
    fn disable_scrubs_everything_but_the_key() {
        let now = Utc::now();
        let mut rec = DirectDepositRecord::empty("u-1", now);
        rec.apply(DirectDepositChange::Save(details()), now);
        assert!(rec.has_numbers_on_file());

        rec.apply(DirectDepositChange::Disable, now);
        assert_eq!(rec, DirectDepositRecord::empty("u-1", now));
        assert!(!rec.has_numbers_on_file());
    }

    #[test]
    fn enable_after_disable_with_numbers_kept() {
        let now = Utc::now();
        let mut rec = DirectDepositRecord::empty("u-1", now);
        rec.apply(DirectDepositChange::Save(details()), now);
        rec.use_direct_deposit = false;
        assert!(rec.apply(DirectDepositChange::EnableExisting, now));
        assert_eq!(rec.account_last4, "5678");
        assert_eq!(rec.routing_encrypted, Some(blob(1)));
    }
}
