use dispatch_crypto::envelope::{FRAME_PREFIX_LEN, open_unframed};
use dispatch_crypto::{CryptoError, Keypair, MessageKind, SignedMessage};
use dispatch_types::models::MailRecord;

use crate::error::{RelayError, Result};

/// Wrap stored payload bytes into a signed envelope ready for the transport.
///
/// Stored rows hold the application payload only; the sender's keypair is
/// applied here, at read time. The container's transport prefix is stripped
/// because the transport re-applies its own framing.
pub fn build_envelope(
    raw: &[u8],
    from_address: &str,
    to_address: &str,
    timestamp: u64,
    keypair: &dyn Keypair,
) -> Result<Vec<u8>> {
    let record = MailRecord::unencrypted(from_address, raw, timestamp, to_address);
    let payload = record
        .encode()
        .map_err(|e| RelayError::Encoding(e.to_string()))?;

    let framed = keypair
        .create_envelope(&SignedMessage {
            kind: MessageKind::Mail,
            payload,
        })
        .map_err(RelayError::Signing)?;

    if framed.len() < FRAME_PREFIX_LEN {
        return Err(RelayError::Signing(CryptoError::Malformed(format!(
            "container shorter than transport prefix: {} bytes",
            framed.len()
        ))));
    }
    Ok(framed[FRAME_PREFIX_LEN..].to_vec())
}

/// Client side of [`build_envelope`]: verify the signature and decode the
/// mail record. Returns the record and the signer's address.
pub fn open_envelope(bytes: &[u8]) -> Result<(MailRecord, String)> {
    let verified = open_unframed(bytes).map_err(RelayError::Signing)?;
    if verified.kind != MessageKind::Mail {
        return Err(RelayError::Encoding(format!(
            "expected mail container, got {:?}",
            verified.kind
        )));
    }
    let record =
        MailRecord::decode(&verified.payload).map_err(|e| RelayError::Encoding(e.to_string()))?;
    Ok((record, verified.signer_address))
}
