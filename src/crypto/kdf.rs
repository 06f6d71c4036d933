//! Key derivation: PBKDF2-HMAC-SHA512 over the account password.
//!
//! The keystream is 64 bytes, used as two independent AES-256-sized keys:
//! the first half decrypts the private key blob, the second half keys the
//! HMAC that vouches for it.

use hmac::Hmac;
use pbkdf2::pbkdf2;
use sha2::Sha512;
use zeroize::Zeroize;

use crate::crypto::{DERIVED_LEN, KEY_LEN};
use crate::error::VaultError;

/// The split PBKDF2 keystream.
///
/// Zeroized on drop so the account-derived keys do not linger in memory.
pub struct DerivedKeys {
    cipher_key: [u8; KEY_LEN],
    hmac_key: [u8; KEY_LEN],
}

impl DerivedKeys {
    /// Key for the AES-256-CBC decryption of the private key blob.
    pub fn cipher_key(&self) -> &[u8; KEY_LEN] {
        &self.cipher_key
    }

    /// Key for the HMAC-SHA-256 integrity check of the blob.
    pub fn hmac_key(&self) -> &[u8; KEY_LEN] {
        &self.hmac_key
    }
}

impl Drop for DerivedKeys {
    fn drop(&mut self) {
        self.cipher_key.zeroize();
        self.hmac_key.zeroize();
    }
}

impl std::fmt::Debug for DerivedKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKeys")
            .field("cipher_key", &"[REDACTED]")
            .field("hmac_key", &"[REDACTED]")
            .finish()
    }
}

/// Derives the 64-byte keystream from the password, salt and iteration count.
///
/// Deterministic: identical inputs always produce identical keys.
pub fn derive_keys(password: &str, salt: &[u8], iterations: u32) -> Result<DerivedKeys, VaultError> {
    if password.is_empty() {
        return Err(VaultError::InvalidParameters("password can't be empty"));
    }
    if salt.is_empty() {
        return Err(VaultError::InvalidParameters("salt can't be empty"));
    }
    if iterations == 0 {
        return Err(VaultError::InvalidParameters(
            "iteration count must be bigger than zero",
        ));
    }

    let mut stream = [0u8; DERIVED_LEN];
    pbkdf2::<Hmac<Sha512>>(password.as_bytes(), salt, iterations, &mut stream)
        .map_err(|_| VaultError::InvalidParameters("invalid derivation output length"))?;

    let mut cipher_key = [0u8; KEY_LEN];
    let mut hmac_key = [0u8; KEY_LEN];
    cipher_key.copy_from_slice(&stream[..KEY_LEN]);
    hmac_key.copy_from_slice(&stream[KEY_LEN..]);
    stream.zeroize();

    Ok(DerivedKeys {
        cipher_key,
        hmac_key,
    })
}
