//! Cryptographic stages of the decryption pipeline.
//!
//! Each stage owns the secret it recovers and hands it to the next stage;
//! nothing is kept alive past its last use.

pub mod block;
pub mod filekey;
pub mod kdf;
pub mod privkey;

pub use block::BlockDecryptor;
pub use filekey::{FileKey, decrypt_file_key};
pub use kdf::{DerivedKeys, derive_keys};
pub use privkey::decrypt_private_key;

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};

use crate::error::VaultError;

/// Length of an AES-256 key (32 bytes).
pub const KEY_LEN: usize = 32;
/// Length of a CBC initialization vector (16 bytes).
pub const IV_LEN: usize = 16;
/// Length of an HMAC-SHA-256 tag (32 bytes).
pub const TAG_LEN: usize = 32;
/// Length of the PBKDF2 keystream: cipher key followed by HMAC key.
pub const DERIVED_LEN: usize = KEY_LEN + KEY_LEN;

/// Decodes a base64 container field, naming the field on failure.
pub(crate) fn decode_b64(field: &str, value: &str) -> Result<Vec<u8>, VaultError> {
    B64.decode(value)
        .map_err(|_| VaultError::InvalidContainer(format!("field '{field}' is not valid base64")))
}
