//! Signed container format.
//!
//! ```text
//! [0..2]   magic "AD"
//! [2..6]   body length (u32 BE)
//! [6..]    postcard(Container { version, kind, payload, signer, signature })
//! ```
//!
//! The 6-byte prefix is transport framing. Stored envelopes handed to the
//! transport layer have it stripped, so clients read them back with
//! [`open_unframed`].

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::error::CryptoError;

pub const MAGIC: [u8; 2] = *b"AD";

/// Magic + length.
pub const FRAME_PREFIX_LEN: usize = 6;

pub const CONTAINER_VERSION: u8 = 1;

const DOMAIN_SEPARATOR: &[u8] = b"dispatch-container-v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum MessageKind {
    Mail = 1,
}

/// Unsigned input to [`crate::Keypair::create_envelope`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedMessage {
    pub kind: MessageKind,
    pub payload: Vec<u8>,
}

/// A container whose signature has been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedMessage {
    pub kind: MessageKind,
    pub payload: Vec<u8>,
    /// Hex public key of the signer, same form as `Keypair::identify`.
    pub signer_address: String,
}

#[derive(Serialize, Deserialize)]
struct Container {
    version: u8,
    kind: MessageKind,
    payload: Vec<u8>,
    signer: [u8; 32],
    signature: Vec<u8>,
}

pub(crate) fn signing_input(message: &SignedMessage) -> Vec<u8> {
    let mut input = Vec::with_capacity(DOMAIN_SEPARATOR.len() + 1 + message.payload.len());
    input.extend_from_slice(DOMAIN_SEPARATOR);
    input.push(message.kind as u8);
    input.extend_from_slice(&message.payload);
    input
}

pub(crate) fn seal(
    message: &SignedMessage,
    signer: [u8; 32],
    signature: [u8; 64],
) -> Result<Vec<u8>, CryptoError> {
    let body = postcard::to_allocvec(&Container {
        version: CONTAINER_VERSION,
        kind: message.kind,
        payload: message.payload.clone(),
        signer,
        signature: signature.to_vec(),
    })
    .map_err(|e| CryptoError::Serialization(e.to_string()))?;

    let len = u32::try_from(body.len())
        .map_err(|_| CryptoError::Serialization(format!("container too large: {} bytes", body.len())))?;

    let mut framed = Vec::with_capacity(FRAME_PREFIX_LEN + body.len());
    framed.extend_from_slice(&MAGIC);
    framed.extend_from_slice(&len.to_be_bytes());
    framed.extend_from_slice(&body);
    Ok(framed)
}

/// Open a container that still carries its transport prefix.
pub fn open(framed: &[u8]) -> Result<VerifiedMessage, CryptoError> {
    if framed.len() < FRAME_PREFIX_LEN {
        return Err(CryptoError::Malformed(format!(
            "frame shorter than prefix: {} bytes",
            framed.len()
        )));
    }
    if framed[0..2] != MAGIC {
        return Err(CryptoError::Malformed("bad magic".into()));
    }
    let mut len_bytes = [0u8; 4];
    len_bytes.copy_from_slice(&framed[2..FRAME_PREFIX_LEN]);
    let declared = u32::from_be_bytes(len_bytes) as usize;
    let body = &framed[FRAME_PREFIX_LEN..];
    if body.len() != declared {
        return Err(CryptoError::Malformed(format!(
            "length mismatch: declared {}, got {}",
            declared,
            body.len()
        )));
    }
    open_unframed(body)
}

/// Open a container whose transport prefix has already been stripped.
pub fn open_unframed(body: &[u8]) -> Result<VerifiedMessage, CryptoError> {
    let container: Container =
        postcard::from_bytes(body).map_err(|e| CryptoError::Malformed(e.to_string()))?;

    if container.version != CONTAINER_VERSION {
        return Err(CryptoError::UnsupportedVersion(container.version));
    }

    let verifying_key =
        VerifyingKey::from_bytes(&container.signer).map_err(|_| CryptoError::InvalidSignature)?;
    let signature = Signature::from_slice(&container.signature)
        .map_err(|e| CryptoError::Malformed(e.to_string()))?;

    let message = SignedMessage {
        kind: container.kind,
        payload: container.payload,
    };
    verifying_key
        .verify(&signing_input(&message), &signature)
        .map_err(|_| CryptoError::InvalidSignature)?;

    Ok(VerifiedMessage {
        kind: message.kind,
        payload: message.payload,
        signer_address: hex::encode(container.signer),
    })
}
