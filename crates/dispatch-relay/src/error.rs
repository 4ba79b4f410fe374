use dispatch_crypto::CryptoError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    /// Address or message id does not resolve.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unknown recipient: {0}")]
    UnknownRecipient(String),

    /// A lookup that must be unique matched several rows.
    #[error("Ambiguous result: {count} rows matched {lookup}")]
    AmbiguousResult { lookup: String, count: usize },

    #[error("Private mail needs at least one recipient")]
    NoRecipients,

    #[error("Stored content does not match its identifier: stored {stored}, computed {computed}")]
    Integrity { stored: String, computed: String },

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Signing error: {0}")]
    Signing(#[source] CryptoError),

    #[error("Unusable keypair for {address}: {source}")]
    Keypair {
        address: String,
        #[source]
        source: CryptoError,
    },
}

pub type Result<T> = std::result::Result<T, RelayError>;
