use dispatch_crypto::{CryptoError, Keypair, SignedMessage, SigningKeypair};
use dispatch_db::Database;

/// Register `address` with a fresh keypair.
pub fn provision(db: &Database, address: &str) -> SigningKeypair {
    let key = SigningKeypair::generate();
    db.create_user(&format!("user-{}", address), address, &key.to_bytes())
        .unwrap();
    key
}

/// Signs like a normal keypair but refuses payloads containing `poison`.
pub struct PickyKeypair {
    pub inner: SigningKeypair,
}

pub const POISON: &[u8] = b"poison";

impl Keypair for PickyKeypair {
    fn create_envelope(&self, message: &SignedMessage) -> Result<Vec<u8>, CryptoError> {
        if message.payload.windows(POISON.len()).any(|w| w == POISON) {
            return Err(CryptoError::Serialization("refusing poisoned payload".into()));
        }
        self.inner.create_envelope(message)
    }

    fn identify(&self) -> String {
        self.inner.identify()
    }
}

pub fn picky_decoder(bytes: &[u8]) -> Result<std::sync::Arc<dyn Keypair>, CryptoError> {
    Ok(std::sync::Arc::new(PickyKeypair {
        inner: SigningKeypair::from_bytes(bytes)?,
    }))
}
