use std::path::PathBuf;
use thiserror::Error;

/// The error type for every stage of the decryption pipeline.
///
/// The first failing stage aborts the whole run; nothing is retried and no
/// partial output is written.
#[derive(Debug, Error)]
pub enum VaultError {
    /// The file could not be opened or read.
    #[error(
        "'{}' can't be opened (make sure the provided path is correct, \
         the file exists and you have the right to open the file)",
        path.display()
    )]
    FileNotReadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not the kind of container it was passed as.
    #[error("{0}")]
    InvalidContainer(String),

    /// The encrypted file carries a format tag this tool does not support.
    #[error("unknown file version found in header, aborting")]
    UnsupportedFormatVersion,

    /// A required field is absent from the record it was expected in.
    #[error("could not find '{0}' in the expected record")]
    FieldNotFound(String),

    /// A numeric field could not be parsed as an integer.
    #[error("could not convert '{field}' value to an integer: '{value}'")]
    MalformedInteger { field: String, value: String },

    /// A cryptographic stage was invoked with unusable inputs.
    #[error("{0}")]
    InvalidParameters(&'static str),

    /// The recomputed HMAC does not match the stored one. Wrong password,
    /// or the key file does not belong to the encrypted file.
    #[error("HMAC hashes do not match, make sure you used a matching .bckey file and password")]
    IntegrityCheckFailed,

    /// The recovered private key failed DER parsing or validation.
    #[error("private key rejected: {0}")]
    InvalidPrivateKey(String),

    /// A cipher rejected its input (bad padding, bad length, bad ciphertext).
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    /// I/O failure outside the parse paths (e.g. writing the output).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
