use weft_types::{hash::HASH_LEN, ObjectHash};

/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag (e.g. `"weft-blob-v1"`) that is prepended
/// to every hash computation. This prevents cross-type collisions: a blob and
/// a version record with identical bytes produce different hashes. The digest
/// is truncated to 160 bits to match the [`ObjectHash`] width.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for blob objects.
    pub const BLOB: Self = Self {
        domain: "weft-blob-v1",
    };
    /// Hasher for file tree objects.
    pub const TREE: Self = Self {
        domain: "weft-tree-v1",
    };
    /// Hasher for version objects.
    pub const VERSION: Self = Self {
        domain: "weft-version-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> ObjectHash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        let digest = hasher.finalize();
        let mut raw = [0u8; HASH_LEN];
        raw.copy_from_slice(&digest.as_bytes()[..HASH_LEN]);
        ObjectHash::from_raw(raw)
    }

    /// Verify that data produces the expected hash.
    pub fn verify(&self, data: &[u8], expected: &ObjectHash) -> bool {
        self.hash(data) == *expected
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let data = b"component file";
        assert_eq!(ContentHasher::BLOB.hash(data), ContentHasher::BLOB.hash(data));
    }

    #[test]
    fn different_domains_produce_different_hashes() {
        let data = b"same content";
        let blob = ContentHasher::BLOB.hash(data);
        let tree = ContentHasher::TREE.hash(data);
        let version = ContentHasher::VERSION.hash(data);
        assert_ne!(blob, tree);
        assert_ne!(blob, version);
        assert_ne!(tree, version);
    }

    #[test]
    fn verify_correct_and_tampered() {
        let hash = ContentHasher::BLOB.hash(b"original");
        assert!(ContentHasher::BLOB.verify(b"original", &hash));
        assert!(!ContentHasher::BLOB.verify(b"tampered", &hash));
    }

    #[test]
    fn custom_domain_differs() {
        let hasher = ContentHasher::new("weft-custom-v1");
        assert_ne!(hasher.hash(b"data"), ContentHasher::BLOB.hash(b"data"));
    }
}
