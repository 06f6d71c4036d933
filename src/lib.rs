//! Offline decryption of Boxcryptor-encrypted files.
//!
//! One run decrypts exactly one `.bc` file, given the account's `.bckey`
//! export and its password. The pipeline is strictly forward:
//!
//! 1. parse the key file and the encrypted file's header
//! 2. derive the account keys from the password (PBKDF2)
//! 3. recover the RSA private key (HMAC check, then AES-256-CBC)
//! 4. unwrap the per-file AES key (RSA-OAEP)
//! 5. decrypt the body block by block and write the plaintext
//!
//! Any failure aborts the run; no partial output is ever written.

mod error;
mod header;
mod keyfile;
mod output;
mod scan;

pub mod crypto;

pub use error::VaultError;
pub use header::{FileHeader, parse_header};
pub use keyfile::{AccountKey, parse_key_file};
pub use output::resolve_output_path;

use std::path::{Path, PathBuf};

use zeroize::Zeroizing;

use crate::crypto::{BlockDecryptor, decrypt_file_key, decrypt_private_key, derive_keys};

/// Decrypts one encrypted file end to end.
///
/// Returns the path the plaintext was written to. The write never replaces
/// an existing file; a numbered name is chosen instead.
pub fn decrypt_file(
    key_file: &Path,
    encrypted_file: &Path,
    password: Zeroizing<String>,
    requested_output: Option<&Path>,
) -> Result<PathBuf, VaultError> {
    let account = parse_key_file(key_file)?;
    let header = parse_header(encrypted_file, requested_output)?;

    let keys = derive_keys(&password, &account.salt, account.kdf_iterations)?;
    drop(password);

    let private_key = decrypt_private_key(&account.encrypted_private_key, &keys)?;
    drop(keys);

    let file_key = decrypt_file_key(&header.encrypted_file_key, &private_key)?;
    drop(private_key);

    let engine = BlockDecryptor::new(
        &file_key,
        &header.base_iv,
        header.block_size,
        header.cipher_padding_len(),
    )?;
    let plaintext = engine.decrypt_file(encrypted_file, header.header_len())?;

    output::write_output(&header.output_path, &plaintext)?;

    Ok(header.output_path)
}
