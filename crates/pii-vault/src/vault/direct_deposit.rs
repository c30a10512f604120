//! Direct-deposit vault: one banking row per user.
//!
//! A write takes exactly one of three branches, checked in this order:
//!
//! 1. **Enable-only**: toggle on with no numbers supplied. Allowed only when
//!    numbers are already on file; details on file are left as they are.
//! 2. **Disable**: toggle off. Scrubs every field. Always succeeds.
//! 3. **Full save**: toggle on with numbers. Validates, fingerprints,
//!    encrypts both numbers and replaces the row.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::protocol::{AccountType, DirectDepositWriteRequest};
use tracing::info;
use zeroize::Zeroizing;

use super::error::VaultError;
use super::require_id;
use super::store::{BankDetails, DirectDepositChange, DirectDepositRecord, DirectDepositStore};
use crate::crypto::Envelope;
use crate::disclosure::Disclosure;
use crate::fields::{mask, validate, ValidationError};

/// Upper bound on digits kept from any submitted number. Longer inputs fail
/// the length checks below instead of being truncated into range.
const MAX_INPUT_DIGITS: usize = 32;

const ACCOUNT_MIN_DIGITS: usize = 4;
const ACCOUNT_MAX_DIGITS: usize = 17;

/// What a caller may see of a user's banking details.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectDepositView {
    pub use_direct_deposit: bool,
    pub account_holder_name: String,
    pub bank_name: String,
    pub account_type: AccountType,
    pub routing_last4: String,
    pub account_last4: String,
    pub has_numbers_on_file: bool,
    pub updated_at: Option<DateTime<Utc>>,
    /// Raw routing digits; only set under [`Disclosure::Full`].
    pub routing_number: Option<String>,
    /// Raw account digits; only set under [`Disclosure::Full`].
    pub account_number: Option<String>,
}

pub struct DirectDepositVault {
    envelope: Envelope,
    store: Arc<dyn DirectDepositStore>,
}

impl DirectDepositVault {
    pub fn new(envelope: Envelope, store: Arc<dyn DirectDepositStore>) -> Self {
        Self { envelope, store }
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Apply a direct-deposit form submission and return the masked result.
    ///
    /// # Errors
    ///
    /// [`VaultError::Validation`] for enable-only with nothing on file or any
    /// full-save field failure; [`VaultError::Config`] if the key is missing.
    pub async fn write(
        &self,
        user_id: &str,
        req: &DirectDepositWriteRequest,
    ) -> Result<DirectDepositView, VaultError> {
        let user_id = require_id(user_id, "userId")?;
        // Any non-blank number field is a full save, even with no digits in it.
        let numbers_supplied =
            !req.routing_number.trim().is_empty() || !req.account_number.trim().is_empty();

        let change = if req.use_direct_deposit && !numbers_supplied {
            DirectDepositChange::EnableExisting
        } else if !req.use_direct_deposit {
            DirectDepositChange::Disable
        } else {
            let routing =
                Zeroizing::new(validate::digits_only(&req.routing_number, MAX_INPUT_DIGITS));
            let account =
                Zeroizing::new(validate::digits_only(&req.account_number, MAX_INPUT_DIGITS));
            DirectDepositChange::Save(self.prepare_save(req, &routing, &account)?)
        };

        let kind = change.kind();
        let record = self.store.upsert(user_id, change).await?.ok_or_else(|| {
            ValidationError::new("Direct deposit cannot be enabled: no bank numbers on file")
        })?;
        info!(user = %user_id, change = kind, "direct deposit record updated");
        self.view(&record, Disclosure::Masked)
    }

    /// Load a user's banking details. Numbers are decrypted into the view only
    /// under [`Disclosure::Full`]. A user with no row reads as disabled and empty.
    pub async fn read(
        &self,
        user_id: &str,
        disclosure: Disclosure,
    ) -> Result<DirectDepositView, VaultError> {
        let user_id = require_id(user_id, "userId")?;
        match self.store.get(user_id).await? {
            Some(record) => self.view(&record, disclosure),
            None => Ok(DirectDepositView::default()),
        }
    }

    fn prepare_save(
        &self,
        req: &DirectDepositWriteRequest,
        routing: &str,
        account: &str,
    ) -> Result<BankDetails, VaultError> {
        let holder = req.account_holder_name.trim();
        if holder.is_empty() {
            return Err(ValidationError::new("Account holder name is required").into());
        }
        let bank = req.bank_name.trim();
        if bank.is_empty() {
            return Err(ValidationError::new("Bank name is required").into());
        }
        if routing.len() != validate::ROUTING_DIGITS {
            return Err(ValidationError::new("Routing number must be 9 digits").into());
        }
        if !validate::validate_aba_routing(routing) {
            return Err(ValidationError::new("Routing number is not valid").into());
        }
        if !(ACCOUNT_MIN_DIGITS..=ACCOUNT_MAX_DIGITS).contains(&account.len()) {
            return Err(ValidationError::new(format!(
                "Account number must be {ACCOUNT_MIN_DIGITS} to {ACCOUNT_MAX_DIGITS} digits"
            ))
            .into());
        }
        if let Some(confirm) = req
            .confirm_account_number
            .as_deref()
            .filter(|c| !c.trim().is_empty())
        {
            let confirm = Zeroizing::new(validate::digits_only(confirm, MAX_INPUT_DIGITS));
            if confirm.as_str() != account {
                return Err(ValidationError::new("Account numbers do not match").into());
            }
        }

        Ok(BankDetails {
            account_holder_name: holder.to_owned(),
            bank_name: bank.to_owned(),
            account_type: req.account_type,
            routing_last4: mask::last4(routing),
            account_last4: mask::last4(account),
            routing_encrypted: self.envelope.seal(routing)?,
            account_encrypted: self.envelope.seal(account)?,
        })
    }

    fn view(
        &self,
        record: &DirectDepositRecord,
        disclosure: Disclosure,
    ) -> Result<DirectDepositView, VaultError> {
        let (routing_number, account_number) = if disclosure.is_full() {
            (
                record
                    .routing_encrypted
                    .as_ref()
                    .map(|b| self.envelope.open(b))
                    .transpose()?,
                record
                    .account_encrypted
                    .as_ref()
                    .map(|b| self.envelope.open(b))
                    .transpose()?,
            )
        } else {
            (None, None)
        };

        Ok(DirectDepositView {
            use_direct_deposit: record.use_direct_deposit,
            account_holder_name: record.account_holder_name.clone(),
            bank_name: record.bank_name.clone(),
            account_type: record.account_type,
            routing_last4: record.routing_last4.clone(),
            account_last4: record.account_last4.clone(),
            has_numbers_on_file: record.has_numbers_on_file(),
            updated_at: Some(record.updated_at),
            routing_number,
            account_number,
        })
    }
}
