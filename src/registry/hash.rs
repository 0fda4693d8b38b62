//! Content hash of an ordered source list.

/// Number of hex characters kept for the short key.
pub const SHORT_LEN: usize = 5;

/// 128-bit content hash of an ordered list of sources (blake3, truncated).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceHash([u8; 16]);

impl SourceHash {
    /// Hash the canonical serialization of `sources`.
    ///
    /// Each entry is length-prefixed, so list boundaries are part of the
    /// hash: `["ab", "c"]` and `["a", "bc"]` differ.
    pub fn of<S: AsRef<str>>(sources: &[S]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(sources.len() as u64).to_le_bytes());
        for source in sources {
            let bytes = source.as_ref().as_bytes();
            hasher.update(&(bytes.len() as u64).to_le_bytes());
            hasher.update(bytes);
        }
        let mut out = [0u8; 16];
        out.copy_from_slice(&hasher.finalize().as_bytes()[..16]);
        Self(out)
    }

    /// Full 32-character hex form.
    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }

    /// Last [`SHORT_LEN`] hex characters.
    pub fn short(self) -> String {
        let full = self.to_hex();
        full[full.len() - SHORT_LEN..].to_string()
    }
}

impl std::fmt::Display for SourceHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_shape() {
        let h = SourceHash::of(&["/a.css", "/b.css"]);
        assert_eq!(h.to_hex().len(), 32);
        assert_eq!(h.short().len(), 5);
        assert!(h.to_hex().ends_with(&h.short()));
    }

    #[test]
    fn test_order_and_boundaries_matter() {
        assert_eq!(SourceHash::of(&["/a", "/b"]), SourceHash::of(&["/a", "/b"]));
        assert_ne!(SourceHash::of(&["/a", "/b"]), SourceHash::of(&["/b", "/a"]));
        assert_ne!(SourceHash::of(&["ab", "c"]), SourceHash::of(&["a", "bc"]));
    }
}
