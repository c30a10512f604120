//! [`Envelope`]: a vault key bound to the field cipher.

use thiserror::Error;
use tracing::warn;

use super::cipher::{self, CipherError, EncryptedBlob};
use crate::keys::{KeyCell, KeyError};

/// Errors from sealing or opening a field.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The vault key could not be loaded.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// Encryption or authentication failed.
    #[error(transparent)]
    Cipher(#[from] CipherError),
}

/// Seals and opens string fields under one vault's key.
///
/// Cheap to clone; clones share the underlying [`KeyCell`].
#[derive(Debug, Clone)]
pub struct Envelope {
    key: KeyCell,
}

impl Envelope {
    pub fn new(key: KeyCell) -> Self {
        Self { key }
    }

    /// The key cell backing this envelope.
    pub fn key(&self) -> &KeyCell {
        &self.key
    }

    /// Encrypt `plaintext` under a fresh nonce.
    pub fn seal(&self, plaintext: &str) -> Result<EncryptedBlob, EnvelopeError> {
        let key = self.key.get()?;
        Ok(cipher::encrypt(plaintext, &key)?)
    }

    /// Decrypt `blob`.
    ///
    /// Authentication failures are logged with the key name only.
    pub fn open(&self, blob: &EncryptedBlob) -> Result<String, EnvelopeError> {
        let key = self.key.get()?;
        cipher::decrypt(blob, &key).map_err(|e| {
            warn!(key = %self.key.name(), error = %e, "stored field failed to decrypt");
            EnvelopeError::Cipher(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{KeyMaterial, KEY_LEN};

    fn envelope(byte: u8) -> Envelope {
        Envelope::new(KeyCell::fixed(KeyMaterial::from_bytes([byte; KEY_LEN])))
    }

    #[test]
    fn seal_then_open() {
        let env = envelope(1);
        let blob = env.seal("123456789").unwrap();
        assert_eq!(env.open(&blob).unwrap(), "123456789");
    }

    #[test]
    fn open_with_other_key_is_cipher_error() {
        let blob = envelope(1).seal("123456789").unwrap();
        assert!(matches!(
            envelope(2).open(&blob),
            Err(EnvelopeError::Cipher(CipherError::AuthenticationFailed))
        ));
    }

    #[test]
    fn missing_key_is_key_error() {
        let env = Envelope::new(KeyCell::from_env("PII_VAULT_TEST_ENVELOPE_UNSET"));
        assert!(matches!(env.seal("x"), Err(EnvelopeError::Key(KeyError::Missing(_)))));
    }
}
