//! Encrypted file (`.bc`) header parsing.
//!
//! Layout of the file:
//!
//! ```text
//! offset 0   4 bytes   format tag, must be "bc01"
//! offset 4   4 bytes   core header length   (little-endian u32)
//! offset 8   4 bytes   core padding length  (little-endian u32)
//! offset 12  4 bytes   cipher padding length (little-endian u32)
//! offset 48  coreLen   core header text (JSON-shaped)
//! then       padding   core padding bytes
//! then       ...       ciphertext, block-wise
//! ```
//!
//! The core header text names the body cipher's block size, the base IV and
//! one RSA-wrapped file key per authorized user; only the first key entry is
//! used.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::crypto::decode_b64;
use crate::error::VaultError;
use crate::output;
use crate::scan::{self, Span};

/// The only file version this tool understands.
pub const FORMAT_TAG: [u8; 4] = *b"bc01";
/// The fixed header region is always 48 bytes; the core header text starts
/// right after it.
pub const RAW_HEADER_LEN: usize = 48;

/// Everything the body decryption needs, read from the file header.
#[derive(Debug)]
pub struct FileHeader {
    /// Ciphertext unit size for the block-wise body decryption.
    pub block_size: usize,
    /// Base initialization vector, decoded from its base64 form.
    pub base_iv: Vec<u8>,
    /// First entry of `encryptedFileKeys`: the RSA-wrapped file key, base64.
    pub encrypted_file_key: String,
    /// Collision-free path the plaintext will be written to.
    pub output_path: PathBuf,
    core_len: u32,
    core_padding_len: u32,
    cipher_padding_len: u32,
}

impl FileHeader {
    /// Offset at which the ciphertext begins.
    pub fn header_len(&self) -> usize {
        RAW_HEADER_LEN + self.core_len as usize + self.core_padding_len as usize
    }

    /// Declared padding length of the final ciphertext block; zero means
    /// the body is stored without removable padding.
    pub fn cipher_padding_len(&self) -> usize {
        self.cipher_padding_len as usize
    }
}

/// Reads and parses the header of an encrypted file.
///
/// `requested_output` is the caller's output path wish; the resolved,
/// collision-free path is stored in the returned header.
pub fn parse_header(
    path: &Path,
    requested_output: Option<&Path>,
) -> Result<FileHeader, VaultError> {
    if path.extension().and_then(|e| e.to_str()) != Some("bc") {
        return Err(VaultError::InvalidContainer(format!(
            "'{}' does not have the right extension ('.bc'), \
             please specify a Boxcryptor encrypted file",
            path.display()
        )));
    }

    let not_readable = |source| VaultError::FileNotReadable {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(not_readable)?;

    // the tag is checked before anything else is read
    let mut tag = [0u8; 4];
    file.read_exact(&mut tag).map_err(not_readable)?;
    if tag != FORMAT_TAG {
        return Err(VaultError::UnsupportedFormatVersion);
    }

    let mut lengths = [0u8; 12];
    file.read_exact(&mut lengths).map_err(not_readable)?;
    let core_len = u32::from_le_bytes(lengths[0..4].try_into().unwrap());
    let core_padding_len = u32::from_le_bytes(lengths[4..8].try_into().unwrap());
    let cipher_padding_len = u32::from_le_bytes(lengths[8..12].try_into().unwrap());

    file.seek(SeekFrom::Start(RAW_HEADER_LEN as u64))
        .map_err(not_readable)?;
    let mut core = vec![0u8; core_len as usize];
    file.read_exact(&mut core).map_err(|_| {
        VaultError::InvalidContainer(format!(
            "file ends before the declared {core_len} byte core header"
        ))
    })?;
    let core = String::from_utf8_lossy(&core);

    let whole = Span::whole(&core);
    let block_size = scan::int_field(&core, whole, "blockSize")? as usize;
    let base_iv = decode_b64("iv", &scan::string_field(&core, whole, "iv")?)?;

    let key_entry = scan::first_object_of_array(&core, "encryptedFileKeys")?;
    let encrypted_file_key = scan::string_field(&core, key_entry, "value")?;

    let output_path = output::resolve_output_path(path, requested_output)?;

    Ok(FileHeader {
        block_size,
        base_iv,
        encrypted_file_key,
        output_path,
        core_len,
        core_padding_len,
        cipher_padding_len,
    })
}
