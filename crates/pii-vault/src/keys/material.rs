//! [`KeyMaterial`]: a 32-byte AES-256 key decoded from hex or base64.

use base64::{
    engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD},
    Engine as _,
};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Errors produced while loading key material.
///
/// Messages name the environment variable only; they never contain any part
/// of its value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// The variable is unset or empty.
    #[error("{0} is not set")]
    Missing(String),

    /// The variable is not valid hex, base64, or base64url.
    #[error("{0} is not valid hex or base64")]
    Malformed(String),

    /// The variable decoded, but not to exactly [`KEY_LEN`] bytes.
    #[error("{name} must decode to {KEY_LEN} bytes, got {actual}")]
    InvalidLength { name: String, actual: usize },
}

/// Symmetric key for one vault. Zeroed on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    bytes: [u8; KEY_LEN],
}

impl KeyMaterial {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Returns the key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// Decode key material supplied under the variable `name`.
    ///
    /// Accepted encodings:
    /// - hexadecimal: even length of at least 64 characters, all hex digits;
    /// - base64url: any string containing `-` or `_`;
    /// - standard base64 otherwise.
    ///
    /// Base64 padding is optional.
    ///
    /// # Errors
    ///
    /// [`KeyError::Missing`] for an empty value, [`KeyError::Malformed`] if no
    /// encoding applies, [`KeyError::InvalidLength`] if the decoded key is not
    /// [`KEY_LEN`] bytes.
    pub fn decode(name: &str, raw: &str) -> Result<Self, KeyError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(KeyError::Missing(name.to_owned()));
        }

        let decoded =
            Zeroizing::new(decode_bytes(raw).ok_or_else(|| KeyError::Malformed(name.to_owned()))?);
        if decoded.len() != KEY_LEN {
            return Err(KeyError::InvalidLength {
                name: name.to_owned(),
                actual: decoded.len(),
            });
        }

        let mut bytes = [0u8; KEY_LEN];
        bytes.copy_from_slice(&decoded);
        let key = Self::from_bytes(bytes);
        bytes.zeroize();
        Ok(key)
    }

    /// Read and decode the environment variable `name`.
    ///
    /// # Errors
    ///
    /// See [`KeyMaterial::decode`]. A value that is not valid Unicode is
    /// reported as [`KeyError::Malformed`].
    pub fn from_env(name: &str) -> Result<Self, KeyError> {
        match std::env::var(name) {
            Ok(raw) => {
                let raw = Zeroizing::new(raw);
                Self::decode(name, &raw)
            }
            Err(std::env::VarError::NotPresent) => Err(KeyError::Missing(name.to_owned())),
            Err(std::env::VarError::NotUnicode(_)) => Err(KeyError::Malformed(name.to_owned())),
        }
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("KeyMaterial([REDACTED])")
    }
}

fn decode_bytes(raw: &str) -> Option<Vec<u8>> {
    if raw.len() >= KEY_LEN * 2 && raw.len() % 2 == 0 && raw.bytes().all(|b| b.is_ascii_hexdigit())
    {
        return hex::decode(raw).ok();
    }

    let unpadded = raw.trim_end_matches('=');
    if raw.contains(['-', '_']) {
        URL_SAFE_NO_PAD.decode(unpadded).ok()
    } else {
        STANDARD_NO_PAD.decode(unpadded).ok()
    }
}
