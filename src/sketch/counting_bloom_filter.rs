use super::optimal_parameters;
use crate::{
    bitset::CountingBitset,
    hash::{HashFamily, RollingHashFamily},
    kmers::{Base, Kmer, KmerRepr},
    modular::Modulus,
};

// Insert and erase check membership first: a slot cannot tell which key set it,
// so repeated inserts or erases of the same key must not move the counters.

fn probe<const BPC: usize>(data: &CountingBitset<BPC>, size: &Modulus, hashes: &[u64]) -> bool {
    hashes.iter().all(|h| data.test(size.reduce(*h) as usize))
}

fn increment<const BPC: usize>(data: &mut CountingBitset<BPC>, size: &Modulus, hashes: &[u64]) {
    if !probe(data, size, hashes) {
        for h in hashes {
            data.increment(size.reduce(*h) as usize)
        }
    }
}

fn decrement<const BPC: usize>(data: &mut CountingBitset<BPC>, size: &Modulus, hashes: &[u64]) {
    if probe(data, size, hashes) {
        for h in hashes {
            // stuck counters are left alone by the bitset
            data.decrement(size.reduce(*h) as usize)
        }
    }
}

#[allow(dead_code)]
pub struct CountingBloomFilter<H: HashFamily, const BPC: usize = 4> {
    data: CountingBitset<BPC>,
    size: Modulus,
    hash_family: H,
}

#[allow(dead_code)]
impl<H: HashFamily, const BPC: usize> CountingBloomFilter<H, BPC> {
    pub fn optimal(num_elements: usize, bits_per_element: usize, k: usize, repr: KmerRepr) -> Self {
        let (size, nhashes) = optimal_parameters(num_elements, bits_per_element);
        Self::new(size, nhashes, k, repr)
    }

    pub fn new(size: usize, nhashes: usize, k: usize, repr: KmerRepr) -> Self {
        Self {
            data: CountingBitset::new(size),
            size: Modulus::new(size as u64),
            hash_family: H::new(nhashes, k, repr),
        }
    }

    pub fn insert(&mut self, key: &Kmer) {
        let hashes = self.hash_family.hash(key);
        increment(&mut self.data, &self.size, hashes)
    }

    pub fn erase(&mut self, key: &Kmer) {
        let hashes = self.hash_family.hash(key);
        decrement(&mut self.data, &self.size, hashes)
    }

    pub fn contains(&mut self, key: &Kmer) -> bool {
        let hashes = self.hash_family.hash(key);
        probe(&self.data, &self.size, hashes)
    }

    pub fn size(&self) -> usize {
        self.data.size()
    }
}

pub struct RollingCountingBloomFilter<H: RollingHashFamily, const BPC: usize = 4> {
    data: CountingBitset<BPC>,
    size: Modulus,
    hash_family: H,
}

impl<H: RollingHashFamily, const BPC: usize> RollingCountingBloomFilter<H, BPC> {
    pub fn optimal(num_elements: usize, bits_per_element: usize, k: usize, repr: KmerRepr) -> Self {
        let (size, nhashes) = optimal_parameters(num_elements, bits_per_element);
        Self::new(size, nhashes, k, repr)
    }

    pub fn new(size: usize, nhashes: usize, k: usize, repr: KmerRepr) -> Self {
        Self {
            data: CountingBitset::new(size),
            size: Modulus::new(size as u64),
            hash_family: H::new(nhashes, k, repr),
        }
    }

    #[allow(dead_code)]
    pub fn init(&mut self, key: &Kmer) {
        self.hash_family.init(key)
    }

    pub fn reset_hash_family(&mut self) {
        self.hash_family.reset()
    }

    #[inline]
    pub fn roll(&mut self, base: Base) {
        self.hash_family.roll(base)
    }

    #[inline]
    pub fn insert_this(&mut self) {
        increment(&mut self.data, &self.size, self.hash_family.get_hashes())
    }

    #[inline]
    pub fn erase_this(&mut self) {
        decrement(&mut self.data, &self.size, self.hash_family.get_hashes())
    }

    #[inline]
    pub fn contains_this(&self) -> bool {
        probe(&self.data, &self.size, self.hash_family.get_hashes())
    }

    pub fn size(&self) -> usize {
        self.data.size()
    }

    pub fn nhashes(&self) -> usize {
        self.hash_family.nhashes()
    }
}
