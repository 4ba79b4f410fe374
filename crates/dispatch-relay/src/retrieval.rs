use std::sync::Arc;

use dispatch_crypto::identify;
use dispatch_db::Database;
use dispatch_db::models::MailRow;
use tracing::{debug, warn};

use crate::directory::AddressDirectory;
use crate::envelope::build_envelope;
use crate::error::{RelayError, Result};
use crate::mail::PUBLIC_ADDRESS;

/// Read side of the relay. Every call is a single stateless query.
///
/// `since` is an exclusive watermark in unix seconds; 0 returns all history.
/// Results are newest first.
#[derive(Clone)]
pub struct RetrievalService {
    db: Arc<Database>,
    directory: AddressDirectory,
}

impl RetrievalService {
    pub fn new(db: Arc<Database>, directory: AddressDirectory) -> Self {
        Self { db, directory }
    }

    /// Fetch one private message addressed to `requester_address`, signed by
    /// its sender.
    pub fn retrieve_message_for_user(&self, id: &str, requester_address: &str) -> Result<Vec<u8>> {
        // Public mail has no addressee and is only served through the feed.
        if requester_address == PUBLIC_ADDRESS {
            return Err(RelayError::NotFound(format!("message {}", id)));
        }

        let mut rows = self.db.get_mail_for_recipient(id, requester_address)?;

        let row = match rows.len() {
            0 => return Err(RelayError::NotFound(format!("message {}", id))),
            1 => rows.remove(0),
            count => {
                return Err(RelayError::AmbiguousResult {
                    lookup: format!("message {} for {}", id, requester_address),
                    count,
                });
            }
        };

        verify_identifier(&row.mail)?;

        let keypair = self
            .directory
            .decode_keypair(&row.sender_address, &row.sender_keypair)?;

        let envelope = build_envelope(
            &row.mail.content,
            &row.sender_address,
            &row.mail.to_address,
            wire_timestamp(row.mail.timestamp)?,
            keypair.as_ref(),
        )?;

        debug!("Served message {} to {}", id, requester_address);
        Ok(envelope)
    }

    /// Alert payloads for the user at `address`, as stored.
    ///
    /// An address with no user simply has an empty inbox.
    pub fn retrieve_inbox(
        &self,
        address: &str,
        since: u64,
        limit: Option<u32>,
    ) -> Result<Vec<Vec<u8>>> {
        let rows = self.db.get_alerts_since(address, since, limit)?;
        debug!("Inbox for {} since {}: {} alert(s)", address, since, rows.len());
        Ok(rows.into_iter().map(|row| row.payload).collect())
    }

    /// Public mail from `from_address`, each item enveloped with the
    /// sender's keypair. Items that fail to build are left out.
    pub fn retrieve_public(
        &self,
        from_address: &str,
        since: u64,
        limit: Option<u32>,
    ) -> Result<Vec<Vec<u8>>> {
        let sender = match self.directory.resolve_user(from_address) {
            Ok(user) => user,
            Err(RelayError::NotFound(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let rows = self.db.get_public_mail_since(&sender.id, since, limit)?;
        let total = rows.len();

        let envelopes: Vec<Vec<u8>> = rows
            .iter()
            .filter_map(|row| {
                let built = verify_identifier(row).and_then(|_| {
                    build_envelope(
                        &row.content,
                        &sender.address,
                        PUBLIC_ADDRESS,
                        wire_timestamp(row.timestamp)?,
                        sender.keypair.as_ref(),
                    )
                });
                match built {
                    Ok(envelope) => Some(envelope),
                    Err(e) => {
                        warn!("Skipping public mail {} from {}: {}", row.slug, from_address, e);
                        None
                    }
                }
            })
            .collect();

        debug!(
            "Public feed for {} since {}: {}/{} item(s)",
            from_address,
            since,
            envelopes.len(),
            total
        );
        Ok(envelopes)
    }
}

/// Refuse to serve bytes that no longer hash to their slug.
fn verify_identifier(row: &MailRow) -> Result<()> {
    let computed = identify(&row.content);
    if computed != row.slug {
        return Err(RelayError::Integrity {
            stored: row.slug.clone(),
            computed,
        });
    }
    Ok(())
}

fn wire_timestamp(timestamp: i64) -> Result<u64> {
    u64::try_from(timestamp)
        .map_err(|_| RelayError::Encoding(format!("negative timestamp {}", timestamp)))
}
