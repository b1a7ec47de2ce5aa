/// Division free reduction modulo a fixed 64 bit modulus.
///
/// `magic = floor((2^128 - 1) / m)`, so for any 128 bit `x` the estimated quotient
/// `(magic * x) >> 128` is at most one below the true quotient and a single
/// conditional subtraction finishes the reduction.
#[derive(Debug, Copy, Clone)]
pub struct Modulus {
    m: u64,
    magic: u128,
}

/// High 128 bits of the 256 bit product `a * b`
#[inline]
fn mul_hi(a: u128, b: u128) -> u128 {
    const MASK: u128 = u64::MAX as u128;
    let (a0, a1) = (a & MASK, a >> 64);
    let (b0, b1) = (b & MASK, b >> 64);

    let lo_lo = a0 * b0;
    let hi_lo = a1 * b0;
    let lo_hi = a0 * b1;
    let hi_hi = a1 * b1;

    let mid = (lo_lo >> 64) + (hi_lo & MASK) + (lo_hi & MASK);
    hi_hi + (hi_lo >> 64) + (lo_hi >> 64) + (mid >> 64)
}

impl Modulus {
    pub fn new(m: u64) -> Self {
        assert!(m > 0, "Modulus can not be zero");
        Self {
            m,
            magic: u128::MAX / (m as u128),
        }
    }

    /// Partial reduction: result is congruent to `x` and lies in `[0, 2m)`
    #[inline]
    pub fn reduce_lazy(&self, x: u128) -> u128 {
        let q = mul_hi(self.magic, x);
        x - q * (self.m as u128)
    }

    #[inline]
    pub fn reduce_wide(&self, x: u128) -> u64 {
        let r = self.reduce_lazy(x);
        let m = self.m as u128;
        (r - m * ((r >= m) as u128)) as u64
    }

    #[inline]
    pub fn reduce(&self, x: u64) -> u64 {
        self.reduce_wide(x as u128)
    }

    #[inline]
    pub fn add(&self, a: u64, b: u64) -> u64 {
        self.reduce_wide(a as u128 + b as u128)
    }

    /// `a - b mod m` for `a`, `b` already reduced
    #[inline]
    pub fn sub(&self, a: u64, b: u64) -> u64 {
        self.reduce_wide(a as u128 + self.m as u128 - b as u128)
    }

    #[inline]
    pub fn mul(&self, a: u64, b: u64) -> u64 {
        self.reduce_wide(a as u128 * b as u128)
    }

    pub fn pow(&self, base: u64, mut exp: u64) -> u64 {
        let mut result = self.reduce(1);
        let mut a = self.reduce(base);
        while exp > 0 {
            if exp & 1 == 1 {
                result = self.mul(result, a)
            }
            a = self.mul(a, a);
            exp >>= 1;
        }
        result
    }

    /// Multiplicative inverse of `a`. Only valid for a prime modulus.
    pub fn inverse(&self, a: u64) -> u64 {
        assert!(self.m > 1);
        self.pow(a, self.m - 2)
    }
}
