use std::path::Path;

use anyhow::Result;
use dispatch_crypto::SigningKeypair;
use tracing::{info, warn};

/// Load the server's own signing key, creating (and saving) one when the
/// file is absent or unreadable. This key never signs user mail.
pub fn load_or_create(key_file: Option<&Path>) -> Result<SigningKeypair> {
    if let Some(path) = key_file {
        match SigningKeypair::load_from_file(path) {
            Ok(key) => {
                info!("Loaded server key from {}", path.display());
                return Ok(key);
            }
            Err(e) => warn!("Could not load server key from {}: {}", path.display(), e),
        }
    }

    let key = SigningKeypair::generate();
    if let Some(path) = key_file {
        key.save_to_file(path)?;
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch_crypto::Keypair;

    #[test]
    fn creates_then_reuses_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.key");

        let created = load_or_create(Some(&path)).unwrap();
        assert!(path.exists());

        let loaded = load_or_create(Some(&path)).unwrap();
        assert_eq!(created.identify(), loaded.identify());
    }

    #[test]
    fn unreadable_key_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.key");
        std::fs::write(&path, "garbage").unwrap();

        let key = load_or_create(Some(&path)).unwrap();
        let reloaded = SigningKeypair::load_from_file(&path).unwrap();
        assert_eq!(key.identify(), reloaded.identify());
    }

    #[test]
    fn ephemeral_without_path() {
        let a = load_or_create(None).unwrap();
        let b = load_or_create(None).unwrap();
        assert_ne!(a.identify(), b.identify());
    }
}
