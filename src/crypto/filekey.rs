//! RSA recovery of the per-file AES key.
//!
//! The private key plaintext from the account key blob is base64 text of a
//! PKCS#1 DER `RSAPrivateKey`. The wrapped file key decrypts under RSA-OAEP
//! with SHA-1 as both digest and MGF1 hash; that parameter set was fixed by
//! the producing application and cannot be changed here.

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::{Oaep, RsaPrivateKey};
use sha1::Sha1;
use zeroize::{Zeroize, Zeroizing};

use crate::crypto::{KEY_LEN, decode_b64};
use crate::error::VaultError;

// Bytes [0:32] of the RSA plaintext are reserved by the producing
// application; only [32:64] keys the file body.
const FILE_KEY_OFFSET: usize = 32;

/// The AES-256 key for the file body. Zeroized on drop.
pub struct FileKey([u8; KEY_LEN]);

impl FileKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    // production code only obtains a FileKey through RSA unwrapping
    #[cfg(test)]
    pub(crate) fn from_bytes(key: [u8; KEY_LEN]) -> Self {
        Self(key)
    }
}

impl Drop for FileKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl std::fmt::Debug for FileKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("FileKey").field(&"[REDACTED]").finish()
    }
}

/// Unwraps the file key with the recovered private key.
pub fn decrypt_file_key(
    encrypted_file_key: &str,
    private_key_b64: &[u8],
) -> Result<FileKey, VaultError> {
    let wrapped = decode_b64("value", encrypted_file_key)?;
    if wrapped.is_empty() {
        return Err(VaultError::InvalidParameters(
            "encrypted file key can't be empty",
        ));
    }

    let text = std::str::from_utf8(private_key_b64)
        .map_err(|_| VaultError::InvalidPrivateKey("key text is not valid UTF-8".into()))?;
    let der = B64
        .decode(text.trim_end())
        .map_err(|_| VaultError::InvalidPrivateKey("key text is not valid base64".into()))?;

    let private_key = RsaPrivateKey::from_pkcs1_der(&der)
        .map_err(|e| VaultError::InvalidPrivateKey(e.to_string()))?;
    private_key
        .validate()
        .map_err(|e| VaultError::InvalidPrivateKey(e.to_string()))?;

    let plaintext = Zeroizing::new(
        private_key
            .decrypt(Oaep::new::<Sha1>(), &wrapped)
            .map_err(|_| {
                VaultError::DecryptionFailed("RSA-OAEP rejected the encrypted file key".into())
            })?,
    );

    if plaintext.len() < FILE_KEY_OFFSET + KEY_LEN {
        return Err(VaultError::DecryptionFailed(format!(
            "file key plaintext is {} bytes, expected {}",
            plaintext.len(),
            FILE_KEY_OFFSET + KEY_LEN
        )));
    }

    let mut key = [0u8; KEY_LEN];
    key.copy_from_slice(&plaintext[FILE_KEY_OFFSET..FILE_KEY_OFFSET + KEY_LEN]);
    Ok(FileKey(key))
}
