use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Encryption marker for records that are signed but not encrypted.
pub const ENCRYPTION_NONE: &str = "none";

/// Leading byte of every encoded [`MailRecord`].
pub const RECORD_VERSION: u8 = 1;

/// Canonical mail record signed into every envelope served to clients.
/// An empty `to_address` marks public (broadcast) mail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailRecord {
    pub from_address: String,
    pub data: Vec<u8>,
    pub encryption: String,
    pub timestamp: u64,
    pub to_address: String,
}

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Empty record")]
    Empty,

    #[error("Unsupported record version: {0}")]
    UnsupportedVersion(u8),

    #[error("Record codec error: {0}")]
    Codec(#[from] postcard::Error),
}

impl MailRecord {
    pub fn unencrypted(
        from_address: &str,
        data: &[u8],
        timestamp: u64,
        to_address: &str,
    ) -> Self {
        Self {
            from_address: from_address.to_string(),
            data: data.to_vec(),
            encryption: ENCRYPTION_NONE.to_string(),
            timestamp,
            to_address: to_address.to_string(),
        }
    }

    pub fn is_public(&self) -> bool {
        self.to_address.is_empty()
    }

    pub fn encode(&self) -> Result<Vec<u8>, RecordError> {
        let mut out = vec![RECORD_VERSION];
        out.extend(postcard::to_allocvec(self)?);
        Ok(out)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, RecordError> {
        let (&version, body) = bytes.split_first().ok_or(RecordError::Empty)?;
        if version != RECORD_VERSION {
            return Err(RecordError::UnsupportedVersion(version));
        }
        Ok(postcard::from_bytes(body)?)
    }
}
