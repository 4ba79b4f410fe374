use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("Invalid key encoding: {0}")]
    KeyEncoding(String),

    #[error("Key file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Malformed container: {0}")]
    Malformed(String),

    #[error("Unsupported container version: {0}")]
    UnsupportedVersion(u8),

    #[error("Signature verification failed")]
    InvalidSignature,
}
