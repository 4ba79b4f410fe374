use std::sync::Arc;

use dispatch_db::Database;
use tracing::debug;

use crate::clock::Clock;
use crate::directory::AddressDirectory;
use crate::error::{RelayError, Result};

/// Append-only log of delivery notifications.
///
/// An alert tells a recipient that something arrived without carrying the
/// mail itself; the full message stays retrievable by id.
#[derive(Clone)]
pub struct AlertStore {
    db: Arc<Database>,
    directory: AddressDirectory,
    clock: Arc<dyn Clock>,
}

impl AlertStore {
    pub fn new(db: Arc<Database>, directory: AddressDirectory, clock: Arc<dyn Clock>) -> Self {
        Self {
            db,
            directory,
            clock,
        }
    }

    pub fn record_alert(
        &self,
        payload: &[u8],
        recipient_address: &str,
        sender_address: &str,
    ) -> Result<()> {
        // Only the id is stored; the recipient's keypair is never read here.
        let recipient_id = self.directory.resolve_user_id(recipient_address).map_err(|e| match e {
            RelayError::NotFound(_) => RelayError::UnknownRecipient(recipient_address.to_string()),
            other => other,
        })?;

        let timestamp = self.clock.now();
        self.db
            .insert_alert(&recipient_id, sender_address, payload, timestamp)?;

        debug!(
            "Recorded alert for {} from {} at {} ({} bytes)",
            recipient_address,
            sender_address,
            timestamp,
            payload.len()
        );
        Ok(())
    }
}
