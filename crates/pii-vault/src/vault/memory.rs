//! In-process [`SsnStore`] and [`DirectDepositStore`] backed by `DashMap`.
//!
//! Each upsert runs under the shard lock for its key, which gives the same
//! guarantees the vaults expect from a SQL upsert: one row per key, last
//! write wins, no partially applied change.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use super::store::{
    DirectDepositChange, DirectDepositRecord, DirectDepositStore, SsnChange, SsnRecord, SsnStore,
    StoreError,
};

/// Reference row store. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    ssn: DashMap<String, SsnRecord>,
    direct_deposit: DashMap<String, DirectDepositRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of direct-deposit rows held.
    pub fn direct_deposit_rows(&self) -> usize {
        self.direct_deposit.len()
    }
}

#[async_trait]
impl SsnStore for MemoryStore {
    async fn get(&self, dependent_id: &str) -> Result<Option<SsnRecord>, StoreError> {
        Ok(self.ssn.get(dependent_id).map(|r| r.value().clone()))
    }

    async fn upsert(
        &self,
        dependent_id: &str,
        change: SsnChange,
    ) -> Result<SsnRecord, StoreError> {
        let now = Utc::now();
        let mut row = self
            .ssn
            .entry(dependent_id.to_owned())
            .or_insert_with(|| SsnRecord::empty(dependent_id, now));
        row.apply(change, now);
        Ok(row.value().clone())
    }
}

#[async_trait]
impl DirectDepositStore for MemoryStore {
    async fn get(&self, user_id: &str) -> Result<Option<DirectDepositRecord>, StoreError> {
        Ok(self.direct_deposit.get(user_id).map(|r| r.value().clone()))
    }

    async fn upsert(
        &self,
        user_id: &str,
        change: DirectDepositChange,
    ) -> Result<Option<DirectDepositRecord>, StoreError> {
        let now = Utc::now();

        // Conditional update: never creates a row.
        if matches!(change, DirectDepositChange::EnableExisting) {
            let Some(mut row) = self.direct_deposit.get_mut(user_id) else {
                return Ok(None);
            };
            let applied = row.apply(change, now);
            return Ok(applied.then(|| row.value().clone()));
        }

        let mut row = self
            .direct_deposit
            .entry(user_id.to_owned())
            .or_insert_with(|| DirectDepositRecord::empty(user_id, now));
        row.apply(change, now);
        Ok(Some(row.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::EncryptedBlob;
    use crate::vault::store::BankDetails;
    use common::protocol::AccountType;
    use std::sync::Arc;

    fn blob() -> EncryptedBlob {
        EncryptedBlob::V1Gcm {
            nonce: [0; 12],
            tag: [0; 16],
            ciphertext: vec![1, 2, 3],
        }
    }

    fn details(holder: &str, account_last4: &str) -> BankDetails {
        BankDetails {
            account_holder_name: holder.into(),
            bank_name: "First Bank".into(),
            account_type: AccountType::Checking,
            routing_last4: "0021".into(),
            account_last4: account_last4.into(),
            routing_encrypted: blob(),
            account_encrypted: blob(),
        }
    }

    #[tokio::test]
    async fn ssn_upsert_creates_then_updates() {
        let store = MemoryStore::new();
        assert!(SsnStore::get(&store, "d-1").await.unwrap().is_none());

        SsnStore::upsert(&store, "d-1", SsnChange::MarkApplied).await.unwrap();
        let rec = SsnStore::upsert(&store, "d-1", SsnChange::Store(blob()))
            .await
            .unwrap();
        assert!(!rec.applied_but_not_received);
        assert_eq!(SsnStore::get(&store, "d-1").await.unwrap(), Some(rec));
    }

    #[tokio::test]
    async fn enable_without_row_writes_nothing() {
        let store = MemoryStore::new();
        let out = DirectDepositStore::upsert(&store, "u-1", DirectDepositChange::EnableExisting)
            .await
            .unwrap();
        assert!(out.is_none());
        assert_eq!(store.direct_deposit_rows(), 0);
    }

    #[tokio::test]
    async fn disable_keeps_the_row() {
        let store = MemoryStore::new();
        DirectDepositStore::upsert(&store, "u-1", DirectDepositChange::Save(details("A", "1111")))
            .await
            .unwrap();
        let rec = DirectDepositStore::upsert(&store, "u-1", DirectDepositChange::Disable)
            .await
            .unwrap()
            .unwrap();
        assert!(!rec.has_numbers_on_file());
        assert_eq!(store.direct_deposit_rows(), 1);
    }

    #[tokio::test]
    async fn concurrent_saves_leave_one_consistent_row() {
        let store = Arc::new(MemoryStore::new());
        let a = {
            let store = store.clone();
            tokio::spawn(async move {
                DirectDepositStore::upsert(
                    &*store,
                    "u-1",
                    DirectDepositChange::Save(details("Alice", "1111")),
                )
                .await
            })
        };
        let b = {
            let store = store.clone();
            tokio::spawn(async move {
                DirectDepositStore::upsert(
                    &*store,
                    "u-1",
                    DirectDepositChange::Save(details("Bob", "2222")),
                )
                .await
            })
        };
        assert!(a.await.unwrap().is_ok());
        assert!(b.await.unwrap().is_ok());

        assert_eq!(store.direct_deposit_rows(), 1);
        let row = DirectDepositStore::get(&*store, "u-1")
            .await
            .unwrap()
            .unwrap();
        let consistent = (row.account_holder_name == "Alice" && row.account_last4 == "1111")
            || (row.account_holder_name == "Bob" && row.account_last4 == "2222");
        assert!(consistent, "fields from different writes mixed: {row:?}");
    }
}
