//! AES-256-GCM encryption and decryption of individual string fields.
//!
//! **Nonces:** every call to [`encrypt`] draws a fresh 96-bit nonce from the OS
//! CSPRNG. Nonces are never derived from the input and never counted; GCM
//! nonce reuse under one key breaks both confidentiality and authentication.

use std::fmt;
use std::str::FromStr;

use aes_gcm::{
    aead::{AeadInPlace, KeyInit, OsRng},
    Aes256Gcm, Nonce, Tag,
};
use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine as _,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::keys::KeyMaterial;

/// Byte length of an AES-GCM nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of the GCM authentication tag (16 bytes = 128 bits).
pub const TAG_LEN: usize = 16;

/// Prefix of the canonical string form of a [`EncryptedBlob::V1Gcm`].
pub const V1_PREFIX: &str = "v1";

/// A stored, encrypted field value.
///
/// The canonical string representation is
/// `v1.<base64url(nonce)>.<base64url(tag)>.<base64url(ciphertext)>`.
/// New schemes are added as new variants with their own prefix, so rows
/// written under older formats keep decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncryptedBlob {
    /// AES-256-GCM with a random 96-bit nonce and detached 128-bit tag.
    V1Gcm {
        nonce: [u8; NONCE_LEN],
        tag: [u8; TAG_LEN],
        ciphertext: Vec<u8>,
    },
}

impl EncryptedBlob {
    /// Parse a stored blob string.
    ///
    /// Besides the canonical `v1.` form this accepts two legacy layouts, both
    /// read as a [`EncryptedBlob::V1Gcm`] and re-emitted in canonical form:
    ///
    /// - unversioned dotted `<nonce>.<tag>.<ciphertext>` in base64url, as
    ///   written to SSN columns before the version prefix existed;
    /// - packed `base64(nonce ‖ tag ‖ ciphertext)` in the standard alphabet,
    ///   as written to banking columns.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidFormat`] if no layout matches.
    pub fn parse(s: &str) -> Result<Self, CipherError> {
        let s = s.trim();
        if s.contains('.') {
            return Self::parse_dotted(s);
        }
        Self::parse_packed(s)
    }

    fn parse_dotted(s: &str) -> Result<Self, CipherError> {
        let parts: Vec<&str> = s.split('.').collect();
        let segments = match parts.as_slice() {
            [version, rest @ ..] if rest.len() == 3 && *version == V1_PREFIX => rest,
            unversioned if unversioned.len() == 3 => unversioned,
            _ => return Err(CipherError::InvalidFormat),
        };
        let nonce = decode_fixed::<NONCE_LEN>(segments[0])?;
        let tag = decode_fixed::<TAG_LEN>(segments[1])?;
        let ciphertext = decode_segment(segments[2])?;
        Ok(Self::V1Gcm {
            nonce,
            tag,
            ciphertext,
        })
    }

    fn parse_packed(s: &str) -> Result<Self, CipherError> {
        let bytes = STANDARD.decode(s).map_err(|_| CipherError::InvalidFormat)?;
        if bytes.len() < NONCE_LEN + TAG_LEN {
            return Err(CipherError::InvalidFormat);
        }
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&bytes[..NONCE_LEN]);
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&bytes[NONCE_LEN..NONCE_LEN + TAG_LEN]);
        Ok(Self::V1Gcm {
            nonce,
            tag,
            ciphertext: bytes[NONCE_LEN + TAG_LEN..].to_vec(),
        })
    }
}

/// Base64url, with or without trailing padding.
fn decode_segment(part: &str) -> Result<Vec<u8>, CipherError> {
    URL_SAFE_NO_PAD
        .decode(part.trim_end_matches('='))
        .map_err(|_| CipherError::InvalidFormat)
}

fn decode_fixed<const N: usize>(part: &str) -> Result<[u8; N], CipherError> {
    let bytes = decode_segment(part)?;
    if bytes.len() != N {
        return Err(CipherError::InvalidFormat);
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}

impl fmt::Display for EncryptedBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1Gcm {
                nonce,
                tag,
                ciphertext,
            } => write!(
                f,
                "{}.{}.{}.{}",
                V1_PREFIX,
                URL_SAFE_NO_PAD.encode(nonce),
                URL_SAFE_NO_PAD.encode(tag),
                URL_SAFE_NO_PAD.encode(ciphertext),
            ),
        }
    }
}

impl FromStr for EncryptedBlob {
    type Err = CipherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for EncryptedBlob {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EncryptedBlob {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Errors produced by the cipher layer.
///
/// None of the variants carry key, nonce, tag, or plaintext data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CipherError {
    /// AES-GCM encryption failed (unreachable with a valid key).
    #[error("aead encryption failed")]
    AeadFailure,

    /// The tag did not verify: the data is corrupted or the key is wrong.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The stored value is not a recognised blob, or decrypted to non-UTF-8.
    #[error("invalid encrypted field format")]
    InvalidFormat,
}

/// Encrypt a plaintext string field using AES-256-GCM.
///
/// # Errors
///
/// Returns [`CipherError::AeadFailure`] on an internal AEAD error.
pub fn encrypt(plaintext: &str, key: &KeyMaterial) -> Result<EncryptedBlob, CipherError> {
    let cipher = build_cipher(key);

    use aes_gcm::aead::rand_core::RngCore;
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    let mut buffer = plaintext.as_bytes().to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(&nonce), b"", &mut buffer)
        .map_err(|_| CipherError::AeadFailure)?;

    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(tag.as_slice());

    Ok(EncryptedBlob::V1Gcm {
        nonce,
        tag: tag_bytes,
        ciphertext: buffer,
    })
}

/// Decrypt an [`EncryptedBlob`] back to its plaintext string.
///
/// # Errors
///
/// Returns [`CipherError::AuthenticationFailed`] if the tag does not verify
/// (wrong key or tampered data), [`CipherError::InvalidFormat`] if the
/// plaintext is not UTF-8.
pub fn decrypt(blob: &EncryptedBlob, key: &KeyMaterial) -> Result<String, CipherError> {
    let cipher = build_cipher(key);
    match blob {
        EncryptedBlob::V1Gcm {
            nonce,
            tag,
            ciphertext,
        } => {
            let mut buffer = Zeroizing::new(ciphertext.clone());
            cipher
                .decrypt_in_place_detached(
                    Nonce::from_slice(nonce),
                    b"",
                    buffer.as_mut_slice(),
                    Tag::from_slice(tag),
                )
                .map_err(|_| CipherError::AuthenticationFailed)?;
            std::str::from_utf8(&buffer)
                .map(str::to_owned)
                .map_err(|_| CipherError::InvalidFormat)
        }
    }
}

fn build_cipher(key: &KeyMaterial) -> Aes256Gcm {
    Aes256Gcm::new(key.as_bytes().into())
}
