use std::path::Path;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use ed25519_dalek::{Signer, SigningKey};
use rand_core::OsRng;
use tracing::info;

use crate::envelope::{self, SignedMessage};
use crate::error::CryptoError;

/// Ed25519 seed length.
pub const SEED_LEN: usize = 32;

/// Signing capability attached to an address.
///
/// Per-user keypairs are looked up from storage for every operation; the
/// server's own identity is a separate, long-lived instance.
pub trait Keypair: Send + Sync {
    /// Sign `message` and return the framed container bytes.
    fn create_envelope(&self, message: &SignedMessage) -> Result<Vec<u8>, CryptoError>;

    /// Stable public identity (address) for this keypair.
    fn identify(&self) -> String;
}

/// Ed25519-backed keypair.
#[derive(Clone)]
pub struct SigningKeypair {
    key: SigningKey,
}

impl SigningKeypair {
    pub fn generate() -> Self {
        Self {
            key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Rebuild a keypair from its 32-byte seed (the storage encoding).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let seed: [u8; SEED_LEN] = bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: SEED_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self {
            key: SigningKey::from_bytes(&seed),
        })
    }

    pub fn to_bytes(&self) -> [u8; SEED_LEN] {
        self.key.to_bytes()
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.key.verifying_key().to_bytes()
    }

    /// Encode the seed to base64 for the key file.
    pub fn to_base64(&self) -> String {
        BASE64.encode(self.to_bytes())
    }

    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        let bytes = BASE64
            .decode(encoded.trim())
            .map_err(|e| CryptoError::KeyEncoding(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, CryptoError> {
        let encoded = std::fs::read_to_string(path)?;
        Self::from_base64(&encoded)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), CryptoError> {
        std::fs::write(path, self.to_base64())?;
        info!("Saved key to {}", path.display());
        Ok(())
    }
}

impl Keypair for SigningKeypair {
    fn create_envelope(&self, message: &SignedMessage) -> Result<Vec<u8>, CryptoError> {
        let signature = self.key.sign(&envelope::signing_input(message));
        envelope::seal(message, self.public_key(), signature.to_bytes())
    }

    fn identify(&self) -> String {
        hex::encode(self.public_key())
    }
}

impl std::fmt::Debug for SigningKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeypair")
            .field("address", &self.identify())
            .finish_non_exhaustive()
    }
}
