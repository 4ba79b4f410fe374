/// Dispatch Crypto Library
///
/// Content identifiers, the `Keypair` signing capability and the signed
/// container format that wraps every mail record handed back to clients.
///
/// Transport encryption is not applied here: records carry an explicit
/// "none" encryption marker and rely on the container signature alone.

pub mod envelope;
pub mod error;
pub mod identify;
pub mod keys;

pub use envelope::{MessageKind, SignedMessage, VerifiedMessage};
pub use error::CryptoError;
pub use identify::identify;
pub use keys::{Keypair, SigningKeypair};
