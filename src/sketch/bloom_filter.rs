use super::optimal_parameters;
use crate::{
    bitset::DynamicBitset,
    hash::{HashFamily, RollingHashFamily},
    kmers::{Base, Kmer, KmerRepr},
    modular::Modulus,
};

fn probe(data: &DynamicBitset, size: &Modulus, hashes: &[u64]) -> bool {
    hashes.iter().all(|h| data.test(size.reduce(*h) as usize))
}

fn mark(data: &mut DynamicBitset, size: &Modulus, hashes: &[u64]) {
    for h in hashes {
        data.set(size.reduce(*h) as usize)
    }
}

/// Bloom filter hashing each key from scratch
#[allow(dead_code)]
pub struct BloomFilter<H: HashFamily> {
    data: DynamicBitset,
    size: Modulus,
    hash_family: H,
}

#[allow(dead_code)]
impl<H: HashFamily> BloomFilter<H> {
    pub fn optimal(num_elements: usize, bits_per_element: usize, k: usize, repr: KmerRepr) -> Self {
        let (size, nhashes) = optimal_parameters(num_elements, bits_per_element);
        Self::new(size, nhashes, k, repr)
    }

    pub fn new(size: usize, nhashes: usize, k: usize, repr: KmerRepr) -> Self {
        Self {
            data: DynamicBitset::new(size),
            size: Modulus::new(size as u64),
            hash_family: H::new(nhashes, k, repr),
        }
    }

    pub fn insert(&mut self, key: &Kmer) {
        let hashes = self.hash_family.hash(key);
        mark(&mut self.data, &self.size, hashes)
    }

    pub fn contains(&mut self, key: &Kmer) -> bool {
        let hashes = self.hash_family.hash(key);
        probe(&self.data, &self.size, hashes)
    }

    pub fn size(&self) -> usize {
        self.data.size()
    }

    pub fn nhashes(&self) -> usize {
        self.hash_family.nhashes()
    }
}

/// Bloom filter probed with the current window of its rolling hash family
pub struct RollingBloomFilter<H: RollingHashFamily> {
    data: DynamicBitset,
    size: Modulus,
    hash_family: H,
}

impl<H: RollingHashFamily> RollingBloomFilter<H> {
    pub fn optimal(num_elements: usize, bits_per_element: usize, k: usize, repr: KmerRepr) -> Self {
        let (size, nhashes) = optimal_parameters(num_elements, bits_per_element);
        Self::new(size, nhashes, k, repr)
    }

    pub fn new(size: usize, nhashes: usize, k: usize, repr: KmerRepr) -> Self {
        Self {
            data: DynamicBitset::new(size),
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
        mark(&mut self.data, &self.size, self.hash_family.get_hashes())
    }

    #[inline]
    pub fn contains_this(&self) -> bool {
        probe(&self.data, &self.size, self.hash_family.get_hashes())
    }

    /// Probe an arbitrary kmer. Hashing happens on a copy of the family so the
    /// rolling window is left untouched.
    #[allow(dead_code)]
    pub fn contains(&self, key: &Kmer) -> bool {
        let mut scratch = self.hash_family.clone();
        probe(&self.data, &self.size, scratch.hash(key))
    }

    pub fn size(&self) -> usize {
        self.data.size()
    }

    pub fn nhashes(&self) -> usize {
        self.hash_family.nhashes()
    }

    /// Fraction of bits set
    pub fn occupancy(&self) -> f64 {
        self.data.count_ones() as f64 / self.data.size() as f64
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        hash::{MurmurHashFamily, PolyHashFamily},
        kmers::test::random_dna,
    };
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn no_false_negatives() {
        let mut rng = StdRng::seed_from_u64(8);
        let k = 15;
        let keys: Vec<_> = (0..1000)
            .map(|_| Kmer::from_bases(&random_dna(&mut rng, k)).unwrap())
            .collect();
        let mut bf = BloomFilter::<MurmurHashFamily>::optimal(500, 4, k, KmerRepr::Canon);
        let mut rbf = RollingBloomFilter::<PolyHashFamily>::optimal(500, 4, k, KmerRepr::Canon);
        for key in keys.iter() {
            bf.insert(key);
            rbf.init(key);
            rbf.insert_this();
        }
        for key in keys.iter() {
            assert!(bf.contains(key));
            assert!(rbf.contains(key));
        }
    }

    #[test]
    fn false_positive_rate() {
        let mut rng = StdRng::seed_from_u64(9);
        let k = 31;
        let mut bf = BloomFilter::<MurmurHashFamily>::optimal(10000, 10, k, KmerRepr::Forward);
        assert_eq!(bf.nhashes(), 7);
        assert_eq!(bf.size(), 100000);
        for _ in 0..10000 {
            bf.insert(&Kmer::from_bases(&random_dna(&mut rng, k)).unwrap());
        }
        let fp = (0..10000)
            .filter(|_| bf.contains(&Kmer::from_bases(&random_dna(&mut rng, k)).unwrap()))
            .count();
        // Expected ~0.8%
        assert!(fp < 300, "{fp} false positives");
    }

    #[test]
    fn rolling_probe_keeps_window() {
        let k = 5;
        let mut rbf = RollingBloomFilter::<PolyHashFamily>::new(1000, 3, k, KmerRepr::Forward);
        for c in b"ACGTTGCA" {
            rbf.roll(Base::from_u8(*c).unwrap());
        }
        assert_eq!(rbf.occupancy(), 0.0);
        rbf.insert_this();
        assert!(rbf.occupancy() > 0.0 && rbf.occupancy() <= 0.003);
        assert!(rbf.contains(&Kmer::from_bases(b"TTGCA").unwrap()));
        let other = Kmer::from_bases(b"CCCCC").unwrap();
        let before = rbf.contains(&other);
        assert!(rbf.contains_this());
        assert_eq!(rbf.contains(&other), before);

        rbf.reset_hash_family();
        for c in b"TTGCA" {
            rbf.roll(Base::from_u8(*c).unwrap());
        }
        assert!(rbf.contains_this());
    }
}
