//! Content hashing for cache validation and incremental compilation.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A 128-bit content hash computed using XXH3.
///
/// Used as an integrity checksum for files in the local compiler binary
/// cache. Not collision resistant against an adversary; source invalidation
/// uses [`SourceTreeHash`] instead.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Computes a content hash from a byte slice using XXH3-128.
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = xxhash_rust::xxh3::xxh3_128(data);
        Self(hash.to_le_bytes())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

/// A SHA-256 digest over a unit's source and its whole dependency closure.
///
/// Two units with byte-identical source and byte-identical (recursively
/// hashed) dependencies always produce the same digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceTreeHash([u8; 32]);

impl SourceTreeHash {
    /// Hashes the raw content of a single source.
    pub fn of_content(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    /// Combines a unit's own content digest with its dependency digests.
    ///
    /// With no dependencies the content digest is returned unchanged.
    pub fn combine(content: SourceTreeHash, dependencies: &[SourceTreeHash]) -> Self {
        if dependencies.is_empty() {
            return content;
        }
        let mut hasher = Sha256::new();
        hasher.update(content.0);
        for dep in dependencies {
            hasher.update(dep.0);
        }
        Self(hasher.finalize().into())
    }

    /// Returns the digest as `0x`-prefixed lowercase hex, the form stored in
    /// artifacts.
    pub fn to_prefixed_hex(&self) -> String {
        format!("0x{self}")
    }
}

impl fmt::Display for SourceTreeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for SourceTreeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceTreeHash({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let a = ContentHash::from_bytes(b"hello world");
        let b = ContentHash::from_bytes(b"hello world");
        assert_eq!(a, b);
    }

    #[test]
    fn different_inputs_differ() {
        let a = ContentHash::from_bytes(b"hello");
        let b = ContentHash::from_bytes(b"world");
        assert_ne!(a, b);
    }

    #[test]
    fn display_format() {
        let h = ContentHash::from_bytes(b"test");
        let s = format!("{h}");
        assert_eq!(s.len(), 32, "Display should be 32 hex chars");
        assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn serde_roundtrip() {
        let h = ContentHash::from_bytes(b"serde test");
        let json = serde_json::to_string(&h).unwrap();
        let back: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(h, back);
    }

    #[test]
    fn tree_hash_known_sha256() {
        let h = SourceTreeHash::of_content(b"abc");
        assert_eq!(
            h.to_string(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn combine_without_dependencies_is_identity() {
        let own = SourceTreeHash::of_content(b"contract A {}");
        assert_eq!(SourceTreeHash::combine(own, &[]), own);
    }

    #[test]
    fn combine_is_order_sensitive() {
        let own = SourceTreeHash::of_content(b"own");
        let a = SourceTreeHash::of_content(b"a");
        let b = SourceTreeHash::of_content(b"b");
        assert_ne!(
            SourceTreeHash::combine(own, &[a, b]),
            SourceTreeHash::combine(own, &[b, a])
        );
    }

    #[test]
    fn prefixed_hex() {
        let h = SourceTreeHash::of_content(b"x");
        let s = h.to_prefixed_hex();
        assert!(s.starts_with("0x"));
        assert_eq!(s.len(), 66);
    }
}
