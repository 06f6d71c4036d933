//! Block-wise decryption of the file body.
//!
//! The body is a sequence of independently decryptable AES-256-CBC units of
//! `block_size` bytes (the final one may be shorter). No IV is carried from
//! block to block; instead each block's IV is derived from the base IV, the
//! block index and the file key, so any block can be decrypted knowing only
//! its index.

use aes::Aes256;
use cbc::cipher::{
    BlockDecryptMut, KeyIvInit,
    block_padding::{NoPadding, Pkcs7},
};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use std::fs;
use std::path::Path;

use crate::crypto::FileKey;
use crate::error::VaultError;

type Aes256CbcDec = cbc::Decryptor<Aes256>;
type HmacSha256 = Hmac<Sha256>;

/// IV for block `index`: the first `base_iv.len()` bytes of
/// HMAC-SHA-256(base_iv ‖ LE64(index)) keyed with the file key.
pub fn block_iv(base_iv: &[u8], index: u64, key: &[u8]) -> Result<Vec<u8>, VaultError> {
    if base_iv.is_empty() || key.is_empty() {
        return Err(VaultError::InvalidParameters(
            "base initialization vector and crypto key can't be empty",
        ));
    }

    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|_| VaultError::InvalidParameters("crypto key can't be empty"))?;
    mac.update(base_iv);
    mac.update(&index.to_le_bytes());
    let digest = mac.finalize().into_bytes();

    if base_iv.len() > digest.len() {
        return Err(VaultError::InvalidParameters(
            "base initialization vector is longer than the HMAC output",
        ));
    }
    Ok(digest[..base_iv.len()].to_vec())
}

/// Decrypts a file body in independent fixed-size blocks.
pub struct BlockDecryptor<'a> {
    key: &'a FileKey,
    base_iv: &'a [u8],
    block_size: usize,
    cipher_padding: usize,
}

impl<'a> BlockDecryptor<'a> {
    /// `cipher_padding` is the padding length declared in the file header;
    /// zero means the final block carries no removable padding.
    pub fn new(
        key: &'a FileKey,
        base_iv: &'a [u8],
        block_size: usize,
        cipher_padding: usize,
    ) -> Result<Self, VaultError> {
        if block_size == 0 {
            return Err(VaultError::InvalidParameters(
                "block size must be bigger than zero",
            ));
        }
        if base_iv.is_empty() {
            return Err(VaultError::InvalidParameters(
                "base initialization vector can't be empty",
            ));
        }

        Ok(Self {
            key,
            base_iv,
            block_size,
            cipher_padding,
        })
    }

    /// Decrypts the whole body (the bytes after the header) in ascending
    /// block order. An empty body yields an empty plaintext.
    pub fn decrypt_body(&self, body: &[u8]) -> Result<Vec<u8>, VaultError> {
        let mut plaintext = Vec::with_capacity(body.len().saturating_sub(self.cipher_padding));

        for (index, chunk) in body.chunks(self.block_size).enumerate() {
            let iv = block_iv(self.base_iv, index as u64, self.key.as_bytes())?;
            let last = (index + 1) * self.block_size >= body.len();

            let mut buf = chunk.to_vec();
            let cipher = Aes256CbcDec::new_from_slices(self.key.as_bytes(), &iv)
                .map_err(|e| VaultError::DecryptionFailed(e.to_string()))?;

            // padding is only ever removed from the final block, and only
            // when the header declared a nonzero cipher padding length
            let block = if last && self.cipher_padding > 0 {
                cipher.decrypt_padded_mut::<Pkcs7>(&mut buf).map_err(|_| {
                    VaultError::DecryptionFailed(format!("bad padding in final block {index}"))
                })?
            } else {
                cipher.decrypt_padded_mut::<NoPadding>(&mut buf).map_err(|_| {
                    VaultError::DecryptionFailed(format!(
                        "block {index} is not a whole number of cipher blocks"
                    ))
                })?
            };

            plaintext.extend_from_slice(block);
        }

        Ok(plaintext)
    }

    /// Reads `path` and decrypts everything after `offset` (the header
    /// length declared by the file).
    pub fn decrypt_file(&self, path: &Path, offset: usize) -> Result<Vec<u8>, VaultError> {
        let bytes = fs::read(path).map_err(|source| VaultError::FileNotReadable {
            path: path.to_path_buf(),
            source,
        })?;

        if bytes.len() < offset {
            return Err(VaultError::DecryptionFailed(format!(
                "file is {} bytes, shorter than its declared header length {offset}",
                bytes.len()
            )));
        }

        self.decrypt_body(&bytes[offset..])
    }
}
