//! FNV-1 variant used to place keys.
//!
//! Each byte is folded in as multiply-then-xor, starting from a seed of 1
//! rather than the canonical offset basis. This is not resistant to
//! adversarial collisions; tables fed untrusted keys should be built with a
//! keyed `BuildHasher` instead.

use core::hash::{BuildHasher, Hasher};

/// Starting accumulator. Any non-zero value works.
pub const FNV1_SEED: u64 = 1;

/// The 64-bit FNV prime.
pub const FNV1_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Hash a byte slice. The empty slice hashes to `FNV1_SEED`.
#[inline]
pub fn fnv1(bytes: &[u8]) -> u64 {
    fold(FNV1_SEED, bytes)
}

#[inline]
fn fold(mut acc: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        acc = acc.wrapping_mul(FNV1_PRIME);
        acc ^= u64::from(b);
    }
    acc
}

/// Streaming form of [`fnv1`]. Successive `write` calls behave as one
/// call over the concatenated bytes.
#[derive(Clone, Copy, Debug)]
pub struct Fnv1Hasher {
    state: u64,
}

impl Default for Fnv1Hasher {
    fn default() -> Self {
        Self { state: FNV1_SEED }
    }
}

impl Hasher for Fnv1Hasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        self.state = fold(self.state, bytes);
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.state
    }
}

/// Default hasher builder for [`BufTable`](crate::BufTable).
#[derive(Clone, Copy, Debug, Default)]
pub struct Fnv1BuildHasher;

impl BuildHasher for Fnv1BuildHasher {
    type Hasher = Fnv1Hasher;
    fn build_hasher(&self) -> Self::Hasher {
        Fnv1Hasher::default()
    }
}
