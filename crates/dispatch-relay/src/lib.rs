//! Store-and-forward core of the dispatch mail server.
//!
//! Inbound alerts and mail are attributed through the [`AddressDirectory`],
//! persisted by the [`AlertStore`] and [`MailStore`], and served back by the
//! [`RetrievalService`], which re-signs stored payloads with the sender's
//! keypair at read time. [`Delegate`] is the hook set the transport calls.

pub mod alerts;
pub mod clock;
pub mod delegate;
pub mod directory;
pub mod envelope;
pub mod error;
pub mod mail;
pub mod retrieval;

#[cfg(test)]
mod testing;

pub use alerts::AlertStore;
pub use clock::{Clock, ManualClock, SystemClock};
pub use delegate::{Delegate, NullDelegate, RelayDelegate};
pub use directory::{AddressDirectory, User};
pub use error::{RelayError, Result};
pub use mail::MailStore;
pub use retrieval::RetrievalService;
