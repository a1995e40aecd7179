//! Seeded hash functions used by the signature.
//!
//! The session engine only depends on [`HashProvider`]; any deterministic seeded
//! 32/64-bit hash can stand in. [`XxHashProvider`] is the default.

/// Deterministic seeded hashing over byte strings.
///
/// Implementations must be pure: same seed and bytes, same output.
pub trait HashProvider: Send + Sync {
    fn hash32(&self, seed: u32, data: &[u8]) -> u32;
    fn hash64(&self, seed: u64, data: &[u8]) -> u64;
}

/// xxHash32 / xxHash64
#[derive(Debug, Clone, Copy, Default)]
pub struct XxHashProvider;

impl HashProvider for XxHashProvider {
    #[inline]
    fn hash32(&self, seed: u32, data: &[u8]) -> u32 {
        xxhash_rust::xxh32::xxh32(data, seed)
    }

    #[inline]
    fn hash64(&self, seed: u64, data: &[u8]) -> u64 {
        xxhash_rust::xxh64::xxh64(data, seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xxhash_known_vectors() {
        let h = XxHashProvider;
        assert_eq!(h.hash32(0, b""), 0x02CC_5D05);
        assert_eq!(h.hash64(0, b""), 0xEF46_DB37_51D8_E999);
    }

    #[test]
    fn test_seed_changes_output() {
        let h = XxHashProvider;
        assert_ne!(h.hash32(1, b"ticket"), h.hash32(2, b"ticket"));
        assert_ne!(h.hash64(1, b"ticket"), h.hash64(2, b"ticket"));
    }
}
