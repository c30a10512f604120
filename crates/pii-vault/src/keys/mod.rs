//! Vault key material: decoding from the environment and lazy per-vault caching.
//!
//! # Lifecycle
//!
//! 1. Each vault is constructed with a [`KeyCell`] naming the environment
//!    variable that holds its key (or with a fixed [`KeyMaterial`] in tests).
//! 2. The first request that needs the key calls [`KeyCell::get`], which
//!    decodes the variable and publishes the key for the process lifetime.
//! 3. A missing or malformed variable fails only the vault that needs it, and
//!    is retried on the next request rather than cached as a failure.
//!
//! # Security invariants
//!
//! - Key bytes are **never** logged, serialised, or included in error messages.
//! - Decoded buffers are zeroized when dropped.

pub mod cell;
pub mod material;

pub use cell::KeyCell;
pub use material::{KeyError, KeyMaterial, KEY_LEN};
