//! AES-256-GCM field encryption primitives.
//!
//! This module is intentionally free of storage and HTTP dependencies. It
//! provides the low-level encrypt/decrypt operations and the [`Envelope`]
//! binding of a vault key to them.
//!
//! # Ciphertext format
//!
//! ```text
//! v1.<base64url-no-pad(nonce)>.<base64url-no-pad(tag)>.<base64url-no-pad(ciphertext)>
//! ```
//!
//! The `v1` prefix enables future algorithm or key-version migration without
//! breaking existing ciphertext.

pub mod cipher;
pub mod envelope;

pub use cipher::{decrypt, encrypt, CipherError, EncryptedBlob};
pub use envelope::{Envelope, EnvelopeError};
