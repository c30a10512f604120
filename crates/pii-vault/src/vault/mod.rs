//! The two concrete sensitive-field vaults and their storage interface.
//!
//! Writes flow validate → encrypt → one atomic upsert. Reads load the row,
//! always derive masked values, and decrypt for full display only when the
//! request carries [`crate::disclosure::Disclosure::Full`].

pub mod direct_deposit;
pub mod error;
pub mod memory;
pub mod ssn;
pub mod store;

pub use direct_deposit::{DirectDepositVault, DirectDepositView};
pub use error::VaultError;
pub use memory::MemoryStore;
pub use ssn::{SsnVault, SsnView, SsnWrite};

use crate::fields::ValidationError;

/// Trim `id` and reject it when blank.
fn require_id<'a>(id: &'a str, field: &str) -> Result<&'a str, ValidationError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ValidationError::new(format!("{field} is required")));
    }
    Ok(id)
}
