use std::sync::Arc;

use dispatch_db::Database;
use tracing::warn;

use crate::alerts::AlertStore;
use crate::clock::Clock;
use crate::directory::AddressDirectory;
use crate::error::RelayError;
use crate::mail::MailStore;
use crate::retrieval::RetrievalService;

/// Hooks the transport layer calls for every client action.
///
/// Write hooks are fire-and-forget: failures are logged, never returned to
/// the transport. Read hooks degrade to `None` / empty on failure.
pub trait Delegate: Send + Sync {
    /// Whether `user` may open an outbound send connection through us.
    fn allow_send_connection(&self, user: &str) -> bool;

    fn save_incoming_alert(&self, alert: &[u8], to_address: &str, from_address: &str);

    fn save_public_mail(&self, mail: &[u8], from_address: &str);

    /// Returns the content identifier the recipients fetch the mail by.
    fn save_private_mail(
        &self,
        mail: &[u8],
        from_address: &str,
        to_addresses: &[String],
    ) -> Option<String>;

    fn retrieve_message_for_user(&self, id: &str, address: &str) -> Option<Vec<u8>>;

    fn retrieve_inbox(&self, address: &str, since: u64) -> Vec<Vec<u8>>;

    fn retrieve_public(&self, from_address: &str, since: u64) -> Vec<Vec<u8>>;
}

/// Delegate backed by the SQLite stores.
pub struct RelayDelegate {
    alerts: AlertStore,
    mail: MailStore,
    retrieval: RetrievalService,
}

impl RelayDelegate {
    pub fn new(db: Arc<Database>, clock: Arc<dyn Clock>) -> Self {
        let directory = AddressDirectory::new(db.clone());
        Self {
            alerts: AlertStore::new(db.clone(), directory.clone(), clock.clone()),
            mail: MailStore::new(db.clone(), directory.clone(), clock),
            retrieval: RetrievalService::new(db, directory),
        }
    }
}

impl Delegate for RelayDelegate {
    /// The relay stores and serves; it never forwards on a user's behalf.
    fn allow_send_connection(&self, _user: &str) -> bool {
        false
    }

    fn save_incoming_alert(&self, alert: &[u8], to_address: &str, from_address: &str) {
        if let Err(e) = self.alerts.record_alert(alert, to_address, from_address) {
            warn!("Dropped alert from {} to {}: {}", from_address, to_address, e);
        }
    }

    fn save_public_mail(&self, mail: &[u8], from_address: &str) {
        if let Err(e) = self.mail.store_public_mail(mail, from_address) {
            warn!("Dropped public mail from {}: {}", from_address, e);
        }
    }

    fn save_private_mail(
        &self,
        mail: &[u8],
        from_address: &str,
        to_addresses: &[String],
    ) -> Option<String> {
        self.mail
            .store_private_mail(mail, from_address, to_addresses)
            .map_err(|e| warn!("Dropped private mail from {}: {}", from_address, e))
            .ok()
    }

    fn retrieve_message_for_user(&self, id: &str, address: &str) -> Option<Vec<u8>> {
        match self.retrieval.retrieve_message_for_user(id, address) {
            Ok(bytes) => Some(bytes),
            Err(RelayError::NotFound(_)) => None,
            Err(e) => {
                warn!("Failed to retrieve message {} for {}: {}", id, address, e);
                None
            }
        }
    }

    fn retrieve_inbox(&self, address: &str, since: u64) -> Vec<Vec<u8>> {
        self.retrieval
            .retrieve_inbox(address, since, None)
            .unwrap_or_else(|e| {
                warn!("Failed to read inbox for {}: {}", address, e);
                Vec::new()
            })
    }

    fn retrieve_public(&self, from_address: &str, since: u64) -> Vec<Vec<u8>> {
        self.retrieval
            .retrieve_public(from_address, since, None)
            .unwrap_or_else(|e| {
                warn!("Failed to read public feed for {}: {}", from_address, e);
                Vec::new()
            })
    }
}

/// Accepts nothing and serves nothing. Selected explicitly by configuration.
pub struct NullDelegate;

impl Delegate for NullDelegate {
    fn allow_send_connection(&self, _user: &str) -> bool {
        false
    }

    fn save_incoming_alert(&self, _alert: &[u8], _to_address: &str, _from_address: &str) {}

    fn save_public_mail(&self, _mail: &[u8], _from_address: &str) {}

    fn save_private_mail(
        &self,
        _mail: &[u8],
        _from_address: &str,
        _to_addresses: &[String],
    ) -> Option<String> {
        None
    }

    fn retrieve_message_for_user(&self, _id: &str, _address: &str) -> Option<Vec<u8>> {
        None
    }

    fn retrieve_inbox(&self, _address: &str, _since: u64) -> Vec<Vec<u8>> {
        Vec::new()
    }

    fn retrieve_public(&self, _from_address: &str, _since: u64) -> Vec<Vec<u8>> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::testing::provision;

    fn relay() -> (Arc<Database>, RelayDelegate) {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let delegate = RelayDelegate::new(db.clone(), Arc::new(ManualClock::new(10)));
        (db, delegate)
    }

    #[test]
    fn write_failures_are_swallowed() {
        let (_db, delegate) = relay();
        delegate.save_incoming_alert(b"ping", "nobody", "alice");
        delegate.save_public_mail(b"hello", "nobody");
        assert!(delegate.save_private_mail(b"hi", "nobody", &["bob".to_string()]).is_none());
    }

    #[test]
    fn relay_never_allows_send_connections() {
        let (db, delegate) = relay();
        provision(&db, "alice");
        assert!(!delegate.allow_send_connection("alice"));
    }

    #[test]
    fn private_mail_roundtrip_through_hooks() {
        let (db, delegate) = relay();
        provision(&db, "alice");

        let id = delegate
            .save_private_mail(b"note", "alice", &["bob".to_string()])
            .unwrap();
        assert!(delegate.retrieve_message_for_user(&id, "bob").is_some());
        assert!(delegate.retrieve_message_for_user(&id, "alice").is_none());
    }

    #[test]
    fn null_delegate_serves_nothing() {
        let delegate = NullDelegate;
        delegate.save_public_mail(b"hello", "alice");
        assert!(delegate.save_private_mail(b"x", "alice", &["bob".to_string()]).is_none());
        assert!(delegate.retrieve_inbox("alice", 0).is_empty());
        assert!(delegate.retrieve_public("alice", 0).is_empty());
        assert!(delegate.retrieve_message_for_user("id", "alice").is_none());
        assert!(!delegate.allow_send_connection("alice"));
    }
}
