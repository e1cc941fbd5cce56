//! # Content Digest — Fingerprints for Maps and Archives
//!
//! Defines [`ContentDigest`], always SHA-256. Digests identify the
//! contents of a probability map independently of how it was stored, and
//! guard binary archives against truncation and bit rot.
//!
//! Multi-part inputs (shape header, site ids, array bytes) are fed through
//! [`DigestBuilder`] so that large arrays are never copied into one buffer
//! before hashing.

use sha2::{Digest, Sha256};

/// Tag prefixed to the hex form of every digest.
pub const DIGEST_PREFIX: &str = "sha256:";

/// A SHA-256 content digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentDigest {
    /// The raw 32-byte digest value.
    pub bytes: [u8; 32],
}

impl ContentDigest {
    /// Wrap raw digest bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{DIGEST_PREFIX}{}", self.to_hex())
    }
}

/// Incremental SHA-256 digest over several byte slices.
#[derive(Clone, Default)]
pub struct DigestBuilder {
    hasher: Sha256,
}

impl std::fmt::Debug for DigestBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigestBuilder").finish_non_exhaustive()
    }
}

impl DigestBuilder {
    /// Start an empty digest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed more bytes.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.hasher.update(data);
        self
    }

    /// Consume the builder and produce the digest.
    pub fn finish(self) -> ContentDigest {
        let hash = self.hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hash);
        ContentDigest::new(bytes)
    }
}

/// Compute a SHA-256 content digest of a single byte slice.
pub fn sha256_digest(data: &[u8]) -> ContentDigest {
    let mut builder = DigestBuilder::new();
    builder.update(data);
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_digest_deterministic() {
        let d1 = sha256_digest(b"hazard");
        let d2 = sha256_digest(b"hazard");
        assert_eq!(d1, d2);
    }

    #[test]
    fn test_known_sha256_vector() {
        // SHA256 of the empty input.
        assert_eq!(
            sha256_digest(b"").to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_builder_matches_single_shot() {
        let mut builder = DigestBuilder::new();
        builder.update(b"haz").update(b"ard");
        assert_eq!(builder.finish(), sha256_digest(b"hazard"));
    }

    #[test]
    fn test_content_digest_display() {
        let s = sha256_digest(b"{}").to_string();
        assert!(s.starts_with(DIGEST_PREFIX));
        assert_eq!(s.len(), DIGEST_PREFIX.len() + 64);
    }

    #[test]
    fn test_different_inputs_different_digests() {
        assert_ne!(sha256_digest(b"a"), sha256_digest(b"b"));
    }
}
