use sha2::{Digest, Sha256};

/// Width of a content identifier in hex characters.
pub const IDENTIFIER_LEN: usize = 64;

/// Derive the content identifier (slug) for a payload.
///
/// Lowercase hex SHA-256 of the bytes. Depends on nothing but the content,
/// so the same payload always maps to the same slug.
pub fn identify(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn deterministic() {
        let content = b"Hello from Dispatch!";
        assert_eq!(identify(content), identify(content));
        assert_eq!(identify(content), identify(&content.to_vec()));
    }

    #[test]
    fn fixed_width_lowercase_hex() {
        for content in [&b""[..], &b"a"[..], &[0u8; 4096][..]] {
            let id = identify(content);
            assert_eq!(id.len(), IDENTIFIER_LEN);
            assert!(id.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        }
    }

    #[test]
    fn empty_input_is_sha256_of_nothing() {
        assert_eq!(
            identify(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn distinct_inputs_do_not_collide() {
        let mut seen = HashSet::new();
        for i in 0u32..10_000 {
            assert!(seen.insert(identify(&i.to_be_bytes())), "collision at {}", i);
        }
        // Single-bit differences
        let base = vec![0u8; 64];
        let mut flipped = base.clone();
        flipped[63] ^= 1;
        assert_ne!(identify(&base), identify(&flipped));
    }
}
