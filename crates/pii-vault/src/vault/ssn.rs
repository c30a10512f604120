//! SSN vault: one encrypted SSN column per dependent.

use std::sync::Arc;

use tracing::info;
use zeroize::Zeroizing;

use super::error::VaultError;
use super::require_id;
use super::store::{SsnChange, SsnStore};
use crate::crypto::Envelope;
use crate::disclosure::Disclosure;
use crate::fields::{mask, validate, ValidationError};

/// A requested change to a dependent's SSN state.
#[derive(Debug, Clone, Default)]
pub struct SsnWrite {
    /// Plaintext SSN, formatted or not. Blank counts as absent.
    pub ssn: Option<String>,
    pub applied_but_not_received: Option<bool>,
}

/// What a caller may see of a dependent's SSN.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SsnView {
    pub has_ssn: bool,
    pub last4: String,
    pub applied_but_not_received: bool,
    /// `123-45-6789`; only set under [`Disclosure::Full`].
    pub full: Option<String>,
}

impl SsnView {
    /// `•••-••-1234`, or empty with nothing on file.
    pub fn masked(&self) -> String {
        mask::masked_ssn(&self.last4)
    }
}

pub struct SsnVault {
    envelope: Envelope,
    store: Arc<dyn SsnStore>,
}

impl SsnVault {
    pub fn new(envelope: Envelope, store: Arc<dyn SsnStore>) -> Self {
        Self { envelope, store }
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Validate, encrypt, and store an SSN, or record that one was applied for.
    ///
    /// # Errors
    ///
    /// [`VaultError::Validation`] when both an SSN and
    /// `applied_but_not_received = true` are supplied, when neither field is
    /// supplied, or when the SSN is not nine digits.
    pub async fn write(&self, dependent_id: &str, write: SsnWrite) -> Result<(), VaultError> {
        let dependent_id = require_id(dependent_id, "dependentId")?;
        let ssn = write
            .ssn
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let change = match (ssn, write.applied_but_not_received) {
            (Some(_), Some(true)) => {
                return Err(ValidationError::new(
                    "Provide an SSN or mark it as applied for, not both",
                )
                .into())
            }
            (Some(raw), _) => {
                let digits = Zeroizing::new(validate::validate_ssn_digits(raw)?);
                SsnChange::Store(self.envelope.seal(&digits)?)
            }
            (None, Some(true)) => SsnChange::MarkApplied,
            (None, Some(false)) => SsnChange::ClearApplied,
            (None, None) => {
                return Err(ValidationError::new(
                    "Nothing to update: supply an SSN or appliedButNotReceived",
                )
                .into())
            }
        };

        let kind = change.kind();
        self.store.upsert(dependent_id, change).await?;
        info!(dependent = %dependent_id, change = kind, "ssn record updated");
        Ok(())
    }

    /// Load a dependent's SSN state. The full value is decrypted into the view
    /// only under [`Disclosure::Full`].
    ///
    /// # Errors
    ///
    /// [`VaultError::Crypto`] if the stored blob fails authentication;
    /// [`VaultError::Config`] if the key cannot be loaded.
    pub async fn read(
        &self,
        dependent_id: &str,
        disclosure: Disclosure,
    ) -> Result<SsnView, VaultError> {
        let dependent_id = require_id(dependent_id, "dependentId")?;
        let Some(record) = self.store.get(dependent_id).await? else {
            return Ok(SsnView::default());
        };
        let Some(blob) = record.ssn_encrypted.as_ref() else {
            return Ok(SsnView {
                applied_but_not_received: record.applied_but_not_received,
                ..SsnView::default()
            });
        };

        let plaintext = Zeroizing::new(self.envelope.open(blob)?);
        Ok(SsnView {
            has_ssn: true,
            last4: mask::last4(&plaintext),
            applied_but_not_received: record.applied_but_not_received,
            full: disclosure.is_full().then(|| mask::full_ssn(&plaintext)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{KeyCell, KeyMaterial, KEY_LEN};
    use crate::vault::memory::MemoryStore;
    use crate::vault::store::{MockSsnStore, StoreError};
    use uuid::Uuid;

    fn vault() -> SsnVault {
        let key = KeyCell::fixed(KeyMaterial::from_bytes([0x5A; KEY_LEN]));
        SsnVault::new(Envelope::new(key), Arc::new(MemoryStore::new()))
    }

    fn full() -> Disclosure {
        Disclosure::Full {
            reveal_id: Uuid::new_v4(),
        }
    }

    fn ssn(value: &str) -> SsnWrite {
        SsnWrite {
            ssn: Some(value.into()),
            applied_but_not_received: None,
        }
    }

    #[tokio::test]
    async fn write_then_masked_read() {
        let v = vault();
        v.write("d-1", ssn("123-45-6789")).await.unwrap();
        let view = v.read("d-1", Disclosure::Masked).await.unwrap();
        assert!(view.has_ssn);
        assert_eq!(view.last4, "6789");
        assert_eq!(view.masked(), "•••-••-6789");
        assert!(view.full.is_none());
    }

    #[tokio::test]
    async fn full_read_returns_dashed_value() {
        let v = vault();
        v.write("d-1", ssn("123456789")).await.unwrap();
        let view = v.read("d-1", full()).await.unwrap();
        assert_eq!(view.full.as_deref(), Some("123-45-6789"));
    }

    #[tokio::test]
    async fn missing_record_reads_empty() {
        let view = vault().read("d-404", full()).await.unwrap();
        assert_eq!(view, SsnView::default());
    }

    #[tokio::test]
    async fn rejects_ssn_with_applied_flag() {
        let err = vault()
            .write(
                "d-1",
                SsnWrite {
                    ssn: Some("123456789".into()),
                    applied_but_not_received: Some(true),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, VaultError::Validation(_)));
    }

    #[tokio::test]
    async fn rejects_short_ssn() {
        let err = vault().write("d-1", ssn("12345678")).await.unwrap_err();
        assert!(matches!(err, VaultError::Validation(_)));
    }

    #[tokio::test]
    async fn rejects_empty_write() {
        let err = vault()
            .write("d-1", SsnWrite::default())
            .await
            .unwrap_err();
        assert!(matches!(err, VaultError::Validation(_)));
    }

    #[tokio::test]
    async fn rejects_blank_dependent_id() {
        let err = vault().write("  ", ssn("123456789")).await.unwrap_err();
        assert!(matches!(err, VaultError::Validation(_)));
    }

    #[tokio::test]
    async fn applied_flag_clears_stored_ssn() {
        let v = vault();
        v.write("d-1", ssn("123456789")).await.unwrap();
        v.write(
            "d-1",
            SsnWrite {
                ssn: None,
                applied_but_not_received: Some(true),
            },
        )
        .await
        .unwrap();
        let view = v.read("d-1", full()).await.unwrap();
        assert!(!view.has_ssn);
        assert!(view.applied_but_not_received);
        assert!(view.full.is_none());
    }

    #[tokio::test]
    async fn wrong_key_read_is_crypto_error() {
        let store = Arc::new(MemoryStore::new());
        let writer = SsnVault::new(
            Envelope::new(KeyCell::fixed(KeyMaterial::from_bytes([1; KEY_LEN]))),
            store.clone(),
        );
        writer.write("d-1", ssn("123456789")).await.unwrap();

        let reader = SsnVault::new(
            Envelope::new(KeyCell::fixed(KeyMaterial::from_bytes([2; KEY_LEN]))),
            store,
        );
        let err = reader.read("d-1", Disclosure::Masked).await.unwrap_err();
        assert!(matches!(err, VaultError::Crypto(_)));
    }

    #[tokio::test]
    async fn missing_key_is_config_error() {
        let v = SsnVault::new(
            Envelope::new(KeyCell::from_env("PII_VAULT_TEST_SSN_KEY_UNSET")),
            Arc::new(MemoryStore::new()),
        );
        let err = v.write("d-1", ssn("123456789")).await.unwrap_err();
        assert!(matches!(err, VaultError::Config(_)));
    }

    #[tokio::test]
    async fn store_failure_surfaces() {
        let mut store = MockSsnStore::new();
        store
            .expect_upsert()
            .returning(|_, _| Err(StoreError::Unavailable("connection reset".into())));
        let v = SsnVault::new(
            Envelope::new(KeyCell::fixed(KeyMaterial::from_bytes([3; KEY_LEN]))),
            Arc::new(store),
        );
        let err = v.write("d-1", ssn("123456789")).await.unwrap_err();
        assert!(matches!(err, VaultError::Storage(_)));
    }

    #[tokio::test]
    async fn validation_failure_never_touches_store() {
        let mut store = MockSsnStore::new();
        store.expect_upsert().never();
        let v = SsnVault::new(
            Envelope::new(KeyCell::fixed(KeyMaterial::from_bytes([3; KEY_LEN]))),
            Arc::new(store),
        );
        assert!(v.write("d-1", ssn("1234")).await.is_err());
    }
}
