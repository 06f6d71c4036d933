//! Shared test fixture: builds a complete synthetic vault on disk.
//!
//! This is the inverse of the shipped pipeline: it derives the same
//! account keys, seals an RSA private key into an HMAC'd blob, wraps a
//! fresh file key with RSA-OAEP and encrypts a body block by block, so
//! the decryptor can be exercised end to end against known plaintext.

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use cbc::cipher::{
    BlockEncryptMut, KeyIvInit,
    block_padding::{NoPadding, Pkcs7},
};
use hmac::{Hmac, Mac};
use rand::RngCore;
use rand::rngs::OsRng;
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;
use sha2::Sha256;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use bcunlock::crypto::block::block_iv;
use bcunlock::crypto::derive_keys;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type HmacSha256 = Hmac<Sha256>;

pub const PASSWORD: &str = "correct-horse-battery";
pub const BLOCK_SIZE: usize = 64;

const ITERATIONS: u32 = 2000;
const SALT: &[u8] = b"fixture-salt-16b";

pub struct Vault {
    pub key_file: PathBuf,
    pub encrypted_file: PathBuf,
    pub plaintext: Vec<u8>,
}

// one RSA keypair for the whole test binary; generation dominates runtime
fn keypair() -> &'static (RsaPrivateKey, RsaPublicKey) {
    static KEYPAIR: OnceLock<(RsaPrivateKey, RsaPublicKey)> = OnceLock::new();
    KEYPAIR.get_or_init(|| {
        let private = RsaPrivateKey::new(&mut OsRng, 2048).unwrap();
        let public = RsaPublicKey::from(&private);
        (private, public)
    })
}

/// Builds a `.bckey` export and a matching `.bc` file under `dir`.
///
/// With `pad_final`, the final plaintext chunk must be shorter than
/// [`BLOCK_SIZE`] so its padded ciphertext still fits one block unit.
pub fn build_vault(dir: &Path, plaintext: &[u8], pad_final: bool) -> Vault {
    let (private, public) = keypair();
    let keys = derive_keys(PASSWORD, SALT, ITERATIONS).unwrap();

    // private key text, sealed as IV | HMAC tag | AES-256-CBC ciphertext
    let private_b64 = B64.encode(private.to_pkcs1_der().unwrap().as_bytes());
    let blob_iv = [0x24u8; 16];
    let ciphertext = Aes256CbcEnc::new_from_slices(keys.cipher_key(), &blob_iv)
        .unwrap()
        .encrypt_padded_vec_mut::<Pkcs7>(private_b64.as_bytes());

    let mut mac = HmacSha256::new_from_slice(keys.hmac_key()).unwrap();
    mac.update(&ciphertext);
    let tag = mac.finalize().into_bytes();

    let mut blob = blob_iv.to_vec();
    blob.extend_from_slice(&tag);
    blob.extend_from_slice(&ciphertext);

    let key_file = dir.join("account.bckey");
    let export = serde_json::json!({
        "version": 2,
        "users": [{
            "id": "5b2e9c40-usr",
            "kdfIterations": ITERATIONS,
            "privateKey": B64.encode(&blob),
            "salt": B64.encode(SALT),
        }],
    });
    fs::write(&key_file, export.to_string()).unwrap();

    // fresh file key, wrapped behind a 32-byte reserved prefix
    let mut file_key = [0u8; 32];
    OsRng.fill_bytes(&mut file_key);
    let mut rsa_plaintext = vec![0u8; 32];
    rsa_plaintext.extend_from_slice(&file_key);
    let wrapped = public
        .encrypt(&mut OsRng, Oaep::new::<Sha1>(), &rsa_plaintext)
        .unwrap();

    let base_iv = [0x3Cu8; 16];
    let (body, cipher_padding) = encrypt_body(plaintext, &file_key, &base_iv, pad_final);

    let core = format!(
        concat!(
            r#"{{"cipher":{{"algorithm":"AES","blockSize":{bs},"iv":"{iv}","keySize":256,"mode":"CBC"}},"#,
            r#""encryptedFileKeys":[{{"type":"user","value":"{key}"}}]}}"#
        ),
        bs = BLOCK_SIZE,
        iv = B64.encode(base_iv),
        key = B64.encode(&wrapped),
    );
    let core_padding = 21usize;

    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"bc01");
    bytes.extend_from_slice(&(core.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&(core_padding as u32).to_le_bytes());
    bytes.extend_from_slice(&(cipher_padding as u32).to_le_bytes());
    bytes.resize(48, 0);
    bytes.extend_from_slice(core.as_bytes());
    bytes.extend_from_slice(&vec![b' '; core_padding]);
    bytes.extend_from_slice(&body);

    let encrypted_file = dir.join("document.txt.bc");
    fs::write(&encrypted_file, &bytes).unwrap();

    Vault {
        key_file,
        encrypted_file,
        plaintext: plaintext.to_vec(),
    }
}

/// Encrypts `plaintext` in [`BLOCK_SIZE`] units, each under its own derived
/// IV. Returns the body and the cipher padding length for the header.
fn encrypt_body(
    plaintext: &[u8],
    file_key: &[u8; 32],
    base_iv: &[u8],
    pad_final: bool,
) -> (Vec<u8>, usize) {
    let mut body = Vec::new();
    let chunks: Vec<&[u8]> = plaintext.chunks(BLOCK_SIZE).collect();

    for (index, chunk) in chunks.iter().enumerate() {
        let iv = block_iv(base_iv, index as u64, file_key).unwrap();
        let cipher = Aes256CbcEnc::new_from_slices(file_key, &iv).unwrap();
        let last = index + 1 == chunks.len();

        if last && pad_final {
            assert!(chunk.len() < BLOCK_SIZE, "padded tail must fit one block unit");
            body.extend_from_slice(&cipher.encrypt_padded_vec_mut::<Pkcs7>(chunk));
        } else {
            body.extend_from_slice(&cipher.encrypt_padded_vec_mut::<NoPadding>(chunk));
        }
    }

    let padding = body.len() - plaintext.len();
    (body, padding)
}
