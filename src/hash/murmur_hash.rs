use super::{fill_hashes, HashFamily};
use crate::kmers::{Kmer, KmerRepr};

const M: u64 = 0xc6a4a7935bd1e995;
const R: u32 = 47;

const X_SEED: u64 = 0x1234;
const Y_SEED: u64 = 0x5678;

/// MurmurHash64A of a single 64 bit word
#[inline]
fn murmur64(key: u64, seed: u64) -> u64 {
    let mut h = seed ^ 8u64.wrapping_mul(M);

    let mut k = key.wrapping_mul(M);
    k ^= k >> R;
    k = k.wrapping_mul(M);

    h ^= k;
    h = h.wrapping_mul(M);

    h ^= h >> R;
    h = h.wrapping_mul(M);
    h ^ (h >> R)
}

/// Bit mixing hash family over the packed kmer. No rolling state, every call
/// hashes the kmer it is given.
#[derive(Debug, Clone)]
pub struct MurmurHashFamily {
    repr: KmerRepr,
    buffer: Vec<u64>,
}

impl HashFamily for MurmurHashFamily {
    fn new(nhashes: usize, _k: usize, repr: KmerRepr) -> Self {
        Self {
            repr,
            buffer: vec![0; nhashes],
        }
    }

    fn nhashes(&self) -> usize {
        self.buffer.len()
    }

    fn hash(&mut self, kmer: &Kmer) -> &[u64] {
        let key = kmer.data(self.repr);
        fill_hashes(&mut self.buffer, murmur64(key, X_SEED), murmur64(key, Y_SEED));
        &self.buffer
    }
}
