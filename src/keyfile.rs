//! Account key file (`.bckey`) parsing.
//!
//! The export is JSON-shaped text. Only the first record of the `users`
//! array matters: it carries the encrypted private key blob and the PBKDF2
//! parameters protecting it. Every lookup is bounded to that record's span
//! so a second user's material can never be picked up by accident.

use std::fs;
use std::path::Path;

use crate::crypto::decode_b64;
use crate::error::VaultError;
use crate::scan;

/// Derivation parameters and encrypted private key of the first user record.
#[derive(Debug)]
pub struct AccountKey {
    /// Base64 blob: IV, HMAC tag and AES-256-CBC ciphertext. Opaque until
    /// the private key decryption stage.
    pub encrypted_private_key: String,
    /// PBKDF2 salt, already decoded from its base64 form.
    pub salt: Vec<u8>,
    /// PBKDF2 iteration count as stored; validated at derivation time.
    pub kdf_iterations: u32,
}

/// Reads and parses the account key export.
pub fn parse_key_file(path: &Path) -> Result<AccountKey, VaultError> {
    if path.extension().and_then(|e| e.to_str()) != Some("bckey") {
        return Err(VaultError::InvalidContainer(format!(
            "'{}' does not have the right extension ('.bckey'), \
             please specify a Boxcryptor key file",
            path.display()
        )));
    }

    let text = fs::read_to_string(path).map_err(|source| VaultError::FileNotReadable {
        path: path.to_path_buf(),
        source,
    })?;

    let user = scan::first_object_of_array(&text, "users")?;

    let encrypted_private_key = scan::string_field(&text, user, "privateKey")?;
    let salt = decode_b64("salt", &scan::string_field(&text, user, "salt")?)?;
    let kdf_iterations = scan::int_field(&text, user, "kdfIterations")?;

    Ok(AccountKey {
        encrypted_private_key,
        salt,
        kdf_iterations,
    })
}
