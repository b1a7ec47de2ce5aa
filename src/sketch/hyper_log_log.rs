use crate::{
    bitset::CountingBitset,
    hash::HashFamily,
    kmers::{Kmer, KmerRepr},
};

const BITS_PER_BUCKET: usize = 5;

/// HyperLogLog cardinality estimator with `2^B` buckets.
///
/// The low `B` bits of the hash select the bucket, the bucket keeps the
/// maximum of (leading zeros + 1) of the remaining high bits.
pub struct HyperLogLog<H: HashFamily, const B: usize = 12> {
    hash_family: H,
    buckets: CountingBitset<BITS_PER_BUCKET>,
}

impl<H: HashFamily, const B: usize> HyperLogLog<H, B> {
    const BUCKETS: usize = 1 << B;
    const INDEX_MASK: u64 = (1 << B) - 1;

    pub fn new(k: usize, repr: KmerRepr) -> Self {
        assert!(B >= 4 && B <= 20, "Unsupported number of index bits");
        Self {
            hash_family: H::new(1, k, repr),
            buckets: CountingBitset::new(Self::BUCKETS),
        }
    }

    fn alpha() -> f64 {
        0.7213 / (1.0 + 1.079 / Self::BUCKETS as f64)
    }

    pub fn update(&mut self, kmer: &Kmer) {
        let hash = self.hash_family.hash(kmer)[0];
        let index = (hash & Self::INDEX_MASK) as usize;
        let rank = (hash >> B).leading_zeros() - B as u32 + 1;
        if self.buckets.get(index) < rank {
            // clamped to the bucket maximum
            self.buckets.set(index, rank)
        }
    }

    pub fn query(&self) -> usize {
        let m = Self::BUCKETS as f64;
        let (sum, zeros) = (0..Self::BUCKETS).fold((0.0, 0usize), |(s, z), i| {
            let x = self.buckets.get(i);
            (s + 2f64.powi(-(x as i32)), z + (x == 0) as usize)
        });
        let raw = Self::alpha() * m * m / sum;
        let estimate = if 2.0 * raw <= 5.0 * m {
            // Small range: linear counting
            if zeros > 0 {
                m * (m / zeros as f64).ln()
            } else {
                m * m.ln()
            }
        } else {
            raw
        };
        estimate.round() as usize
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{hash::MurmurHashFamily, kmers::test::random_dna};
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    fn count(n: usize, seed: u64) -> (usize, usize) {
        let mut rng = StdRng::seed_from_u64(seed);
        let k = 31;
        let s = random_dna(&mut rng, n + k - 1);
        let mut hll = HyperLogLog::<MurmurHashFamily>::new(k, KmerRepr::Canon);
        let mut exact = HashSet::new();
        let mut kmer = Kmer::new(k);
        for c in s {
            kmer.roll_char(c).unwrap();
            if kmer.is_full() {
                hll.update(&kmer);
                exact.insert(kmer.data(KmerRepr::Canon));
            }
        }
        (hll.query(), exact.len())
    }

    fn rel_error(est: usize, exact: usize) -> f64 {
        (est as f64 - exact as f64).abs() / exact as f64
    }

    #[test]
    fn empty() {
        let hll = HyperLogLog::<MurmurHashFamily>::new(5, KmerRepr::Forward);
        assert_eq!(hll.query(), 0);
    }

    #[test]
    fn small_cardinality_uses_linear_counting() {
        for (n, seed) in [(50, 1), (500, 2), (5000, 3)] {
            let (est, exact) = count(n, seed);
            assert!(rel_error(est, exact) < 0.05, "estimate {est} for {exact}");
        }
    }

    #[test]
    fn large_cardinality() {
        let (est, exact) = count(200_000, 4);
        assert!(rel_error(est, exact) < 0.05, "estimate {est} for {exact}");
    }

    #[test]
    fn duplicates_do_not_count() {
        let mut hll = HyperLogLog::<MurmurHashFamily>::new(4, KmerRepr::Forward);
        let kmers: Vec<_> = [b"ACGT", b"CGTA", b"GTAC", b"TACG"]
            .iter()
            .map(|s| Kmer::from_bases(*s).unwrap())
            .collect();
        for _ in 0..100 {
            for kmer in kmers.iter() {
                hll.update(kmer)
            }
        }
        assert_eq!(hll.query(), 4);
    }
}
