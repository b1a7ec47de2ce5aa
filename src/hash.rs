use crate::kmers::{Base, Kmer, KmerRepr};

mod murmur_hash;
mod poly_hash;

pub use murmur_hash::MurmurHashFamily;
pub use poly_hash::PolyHashFamily;

/// A family of `nhashes` hash functions over kmers
pub trait HashFamily {
    fn new(nhashes: usize, k: usize, repr: KmerRepr) -> Self;

    fn nhashes(&self) -> usize;

    /// Hash `kmer` from scratch, returning `nhashes` values
    fn hash(&mut self, kmer: &Kmer) -> &[u64];
}

/// A hash family that follows a sliding window, one base at a time
pub trait RollingHashFamily: HashFamily + Clone {
    fn roll(&mut self, base: Base);

    fn init(&mut self, kmer: &Kmer);

    fn reset(&mut self);

    /// Hash values of the current window
    fn get_hashes(&self) -> &[u64];
}

/// Double hashing: h_i = x + i * y
#[inline]
fn fill_hashes(buffer: &mut [u64], x: u64, y: u64) {
    for (i, h) in buffer.iter_mut().enumerate() {
        *h = x.wrapping_add((i as u64).wrapping_mul(y))
    }
}
