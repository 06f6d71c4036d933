//! Private key recovery from the account key blob.
//!
//! Decoded blob layout (fixed by the producing application):
//!
//! ```text
//! IV (16) | HMAC-SHA-256 tag (32) | AES-256-CBC ciphertext
//! ```
//!
//! The tag covers the ciphertext and is verified before the cipher runs.
//! On a mismatch nothing is decrypted; the caller is told to check the
//! password / key file pairing.

use aes::Aes256;
use cbc::cipher::{BlockDecryptMut, KeyIvInit, block_padding::Pkcs7};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::crypto::{DerivedKeys, IV_LEN, TAG_LEN, decode_b64};
use crate::error::VaultError;

type Aes256CbcDec = cbc::Decryptor<Aes256>;
type HmacSha256 = Hmac<Sha256>;

// IV, tag, and at least one cipher block
const MIN_BLOB_LEN: usize = IV_LEN + TAG_LEN + 16;

/// Decrypts the base64 private key blob with the derived keys.
///
/// The plaintext is the base64 text of a PKCS#1 DER `RSAPrivateKey`; it is
/// returned still encoded, zeroized on drop.
pub fn decrypt_private_key(
    blob_b64: &str,
    keys: &DerivedKeys,
) -> Result<Zeroizing<Vec<u8>>, VaultError> {
    let blob = decode_b64("privateKey", blob_b64)?;
    if blob.len() < MIN_BLOB_LEN {
        return Err(VaultError::DecryptionFailed(format!(
            "private key blob is {} bytes, expected at least {MIN_BLOB_LEN}",
            blob.len()
        )));
    }

    let (iv, rest) = blob.split_at(IV_LEN);
    let (stored_tag, ciphertext) = rest.split_at(TAG_LEN);

    let mut mac = HmacSha256::new_from_slice(keys.hmac_key())
        .map_err(|_| VaultError::InvalidParameters("HMAC key can't be empty"))?;
    mac.update(ciphertext);
    mac.verify_slice(stored_tag)
        .map_err(|_| VaultError::IntegrityCheckFailed)?;

    let mut buf = Zeroizing::new(ciphertext.to_vec());
    let plaintext = Aes256CbcDec::new_from_slices(keys.cipher_key(), iv)
        .map_err(|e| VaultError::DecryptionFailed(e.to_string()))?
        .decrypt_padded_mut::<Pkcs7>(buf.as_mut_slice())
        .map_err(|_| VaultError::DecryptionFailed("bad padding in private key blob".into()))?;

    Ok(Zeroizing::new(plaintext.to_vec()))
}
