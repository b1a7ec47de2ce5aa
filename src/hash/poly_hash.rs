use super::{fill_hashes, HashFamily, RollingHashFamily};
use crate::{
    kmers::{Base, Kmer, KmerRepr},
    modular::Modulus,
};

const PRIMES: [u64; 10] = [31, 37, 41, 43, 47, 53, 59, 61, 67, 71];
const MODS: [u64; 10] = [
    2305843009213693951,
    2305843009213693921,
    2305843009213693907,
    2305843009213693723,
    2305843009213693693,
    2305843009213693669,
    2305843009213693613,
    2305843009213693561,
    2305843009213693549,
    2305843009213693487,
];

/// SplitMix64 finalizer. Polynomial values of short kmers are far below the
/// modulus and differ in few bits, so they are scrambled before double hashing.
#[inline]
fn mix64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xbf58476d1ce4e5b9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94d049bb133111eb);
    x ^ (x >> 31)
}

/// Value of a base in the polynomial. Unfilled window positions (N) count as 0
#[inline]
fn value(b: Base) -> u64 {
    match b {
        Base::N => 0,
        b => b as u64 + 1,
    }
}

/// Polynomial rolling hash of a window and of its reverse complement.
///
/// For window c_0..c_{k-1} (c_0 oldest):
///   state     = sum v(c_i) * p^(k-1-i)
///   rev_state = sum v(comp(c_i)) * p^i
/// so `rev_state` is the forward hash of the reverse complement.
#[derive(Debug, Clone)]
pub struct PolyHash {
    p: u64,
    inv_p: u64,
    last_exp: u64,
    k: usize,
    state: u64,
    rev_state: u64,
    modulus: Modulus,
}

impl PolyHash {
    pub fn new(p: u64, m: u64, k: usize) -> Self {
        assert!(k > 0);
        let modulus = Modulus::new(m);
        Self {
            p,
            inv_p: modulus.inverse(p),
            last_exp: modulus.pow(p, k as u64 - 1),
            k,
            state: 0,
            rev_state: 0,
            modulus,
        }
    }

    /// Build the `i`th hash of the fixed tables
    pub fn with_seed(i: usize, k: usize) -> Self {
        Self::new(PRIMES[i % PRIMES.len()], MODS[i % MODS.len()], k)
    }

    #[inline]
    pub fn get_hash(&self, use_reverse: bool) -> u64 {
        if use_reverse {
            self.rev_state
        } else {
            self.state
        }
    }

    #[inline]
    pub fn roll(&mut self, n_in: Base, n_out: Base) {
        let md = &self.modulus;

        let s = md.sub(self.state, md.mul(value(n_out), self.last_exp));
        self.state = md.reduce_wide(s as u128 * self.p as u128 + value(n_in) as u128);

        let r = md.sub(self.rev_state, value(n_out.complement()));
        self.rev_state = md.add(
            md.mul(r, self.inv_p),
            md.mul(value(n_in.complement()), self.last_exp),
        );
    }

    pub fn init(&mut self, kmer: &Kmer) {
        if kmer.size() != self.k {
            self.k = kmer.size();
            self.last_exp = self.modulus.pow(self.p, self.k as u64 - 1);
        }
        let md = &self.modulus;
        let (mut state, mut rev_state) = (0, 0);
        for i in 0..self.k {
            let fwd = kmer.get(self.k - 1 - i, KmerRepr::Forward);
            state = md.reduce_wide(state as u128 * self.p as u128 + value(fwd) as u128);
            let rev = kmer.get(i, KmerRepr::Forward).complement();
            rev_state = md.reduce_wide(rev_state as u128 * self.p as u128 + value(rev) as u128);
        }
        self.state = state;
        self.rev_state = rev_state;
    }

    pub fn reset(&mut self) {
        self.state = 0;
        self.rev_state = 0;
    }
}

/// Two polynomial hashes, mixed then combined by double hashing, following their own kmer window
#[derive(Debug, Clone)]
pub struct PolyHashFamily {
    xhash: PolyHash,
    yhash: PolyHash,
    kmer: Kmer,
    repr: KmerRepr,
    buffer: Vec<u64>,
}

impl PolyHashFamily {
    /// The two underlying hash values, read from the reverse complement state if `use_reverse`
    pub fn get_hash(&self, use_reverse: bool) -> [u64; 2] {
        [
            self.xhash.get_hash(use_reverse),
            self.yhash.get_hash(use_reverse),
        ]
    }

    fn use_reverse(&self) -> bool {
        match self.repr {
            KmerRepr::Forward => false,
            KmerRepr::Reverse => true,
            KmerRepr::Canon => self.kmer.uses_reverse(),
        }
    }

    fn update_hashes(&mut self) {
        let [x, y] = self.get_hash(self.use_reverse());
        fill_hashes(&mut self.buffer, mix64(x), mix64(y))
    }
}

impl HashFamily for PolyHashFamily {
    fn new(nhashes: usize, k: usize, repr: KmerRepr) -> Self {
        Self {
            xhash: PolyHash::with_seed(0, k),
            yhash: PolyHash::with_seed(1, k),
            kmer: Kmer::new(k),
            repr,
            buffer: vec![0; nhashes],
        }
    }

    fn nhashes(&self) -> usize {
        self.buffer.len()
    }

    fn hash(&mut self, kmer: &Kmer) -> &[u64] {
        self.init(kmer);
        self.get_hashes()
    }
}

impl RollingHashFamily for PolyHashFamily {
    fn roll(&mut self, base: Base) {
        let n_in = base.packed();
        let n_out = self.kmer.last();
        self.kmer.roll(n_in);
        self.xhash.roll(n_in, n_out);
        self.yhash.roll(n_in, n_out);
        self.update_hashes()
    }

    fn init(&mut self, kmer: &Kmer) {
        self.kmer = kmer.clone();
        self.xhash.init(kmer);
        self.yhash.init(kmer);
        self.update_hashes()
    }

    fn reset(&mut self) {
        self.kmer.reset();
        self.xhash.reset();
        self.yhash.reset();
        self.update_hashes()
    }

    fn get_hashes(&self) -> &[u64] {
        &self.buffer
    }
}
