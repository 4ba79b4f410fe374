use std::collections::BTreeSet;
use std::sync::Arc;

use dispatch_crypto::identify;
use dispatch_db::Database;
use tracing::debug;

use crate::clock::Clock;
use crate::directory::AddressDirectory;
use crate::error::{RelayError, Result};

/// Recipient address stored on public (broadcast) mail.
pub const PUBLIC_ADDRESS: &str = "";

/// Persists full mail payloads, byte-for-byte, under their content identifier.
#[derive(Clone)]
pub struct MailStore {
    db: Arc<Database>,
    directory: AddressDirectory,
    clock: Arc<dyn Clock>,
}

impl MailStore {
    pub fn new(db: Arc<Database>, directory: AddressDirectory, clock: Arc<dyn Clock>) -> Self {
        Self {
            db,
            directory,
            clock,
        }
    }

    /// Store a broadcast from `from_address`. Returns the content identifier.
    pub fn store_public_mail(&self, content: &[u8], from_address: &str) -> Result<String> {
        let sender = self.directory.resolve_user(from_address)?;
        let slug = identify(content);

        let inserted = self.db.insert_mail(
            &slug,
            content,
            &sender.id,
            PUBLIC_ADDRESS,
            self.clock.now(),
        )?;

        debug!(
            "Public mail {} from {} ({})",
            slug,
            from_address,
            if inserted { "stored" } else { "duplicate" }
        );
        Ok(slug)
    }

    /// Store mail addressed to each of `to_addresses`, one row per distinct
    /// recipient, all under the same content identifier (returned).
    pub fn store_private_mail(
        &self,
        content: &[u8],
        from_address: &str,
        to_addresses: &[String],
    ) -> Result<String> {
        let recipients: BTreeSet<&str> = to_addresses
            .iter()
            .map(String::as_str)
            .filter(|a| *a != PUBLIC_ADDRESS)
            .collect();
        if recipients.is_empty() {
            return Err(RelayError::NoRecipients);
        }

        let sender = self.directory.resolve_user(from_address)?;
        let slug = identify(content);
        let timestamp = self.clock.now();

        for recipient in &recipients {
            self.db
                .insert_mail(&slug, content, &sender.id, recipient, timestamp)?;
        }

        debug!(
            "Private mail {} from {} to {} recipient(s)",
            slug,
            from_address,
            recipients.len()
        );
        Ok(slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::testing::provision;

    fn store() -> (Arc<Database>, MailStore) {
        let db = Arc::new(Database::open_in_memory().unwrap());
        provision(&db, "alice");
        let directory = AddressDirectory::new(db.clone());
        let store = MailStore::new(db.clone(), directory, Arc::new(ManualClock::new(42)));
        (db, store)
    }

    #[test]
    fn private_mail_fans_out_under_one_id() {
        let (db, store) = store();
        let to = vec!["bob".to_string(), "carol".to_string(), "bob".to_string()];

        let id = store.store_private_mail(b"secret", "alice", &to).unwrap();
        assert_eq!(id, identify(b"secret"));

        for recipient in ["bob", "carol"] {
            let rows = db.get_mail_for_recipient(&id, recipient).unwrap();
            assert_eq!(rows.len(), 1, "recipient {}", recipient);
            assert_eq!(rows[0].mail.content, b"secret");
            assert_eq!(rows[0].mail.timestamp, 42);
        }
    }

    #[test]
    fn private_mail_needs_recipients() {
        let (_db, store) = store();
        assert!(matches!(
            store.store_private_mail(b"x", "alice", &[]),
            Err(RelayError::NoRecipients)
        ));
        assert!(matches!(
            store.store_private_mail(b"x", "alice", &[String::new()]),
            Err(RelayError::NoRecipients)
        ));
    }

    #[test]
    fn unknown_sender_is_not_found() {
        let (_db, store) = store();
        assert!(matches!(
            store.store_public_mail(b"x", "mallory"),
            Err(RelayError::NotFound(_))
        ));
    }

    #[test]
    fn public_mail_stored_with_empty_recipient() {
        let (db, store) = store();
        let id = store.store_public_mail(b"broadcast", "alice").unwrap();

        let rows = db.get_public_mail_since("user-alice", 0, None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].slug, id);
        assert_eq!(rows[0].to_address, PUBLIC_ADDRESS);
    }

    #[test]
    fn storing_same_public_mail_twice_is_idempotent() {
        let (db, store) = store();
        let first = store.store_public_mail(b"again", "alice").unwrap();
        let second = store.store_public_mail(b"again", "alice").unwrap();
        assert_eq!(first, second);
        assert_eq!(db.get_public_mail_since("user-alice", 0, None).unwrap().len(), 1);
    }
}
