use std::sync::Arc;

use dispatch_crypto::{CryptoError, Keypair, SigningKeypair};
use dispatch_db::Database;
use tracing::debug;

use crate::error::{RelayError, Result};

/// Turns the stored keypair column back into a signing capability.
pub type KeypairDecoder = fn(&[u8]) -> std::result::Result<Arc<dyn Keypair>, CryptoError>;

pub fn decode_signing_keypair(bytes: &[u8]) -> std::result::Result<Arc<dyn Keypair>, CryptoError> {
    Ok(Arc::new(SigningKeypair::from_bytes(bytes)?))
}

/// A registered user with its keypair decoded.
#[derive(Clone)]
pub struct User {
    pub id: String,
    pub address: String,
    pub keypair: Arc<dyn Keypair>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Resolves addresses to users. Exact string match, no normalization.
#[derive(Clone)]
pub struct AddressDirectory {
    db: Arc<Database>,
    decoder: KeypairDecoder,
}

impl AddressDirectory {
    pub fn new(db: Arc<Database>) -> Self {
        Self::with_decoder(db, decode_signing_keypair)
    }

    pub fn with_decoder(db: Arc<Database>, decoder: KeypairDecoder) -> Self {
        Self { db, decoder }
    }

    pub fn resolve_user(&self, address: &str) -> Result<User> {
        let row = self
            .db
            .get_user_by_address(address)?
            .ok_or_else(|| RelayError::NotFound(format!("address {}", address)))?;

        debug!("Resolved address {} to user {}", address, row.id);
        Ok(User {
            keypair: self.decode_keypair(&row.address, &row.keypair)?,
            id: row.id,
            address: row.address,
        })
    }

    /// Id of the user at `address`, without touching its keypair.
    pub fn resolve_user_id(&self, address: &str) -> Result<String> {
        self.db
            .get_user_by_address(address)?
            .map(|row| row.id)
            .ok_or_else(|| RelayError::NotFound(format!("address {}", address)))
    }

    pub fn decode_keypair(&self, address: &str, bytes: &[u8]) -> Result<Arc<dyn Keypair>> {
        (self.decoder)(bytes).map_err(|source| RelayError::Keypair {
            address: address.to_string(),
            source,
        })
    }
}
