use std::fmt;

pub const MAX_KMER_LENGTH: usize = 31;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(u8)]
pub enum Base {
    A = 0,
    C,
    G,
    T,
    N,
}

impl Base {
    pub fn from_u8(c: u8) -> anyhow::Result<Self> {
        match c {
            b'A' | b'a' => Ok(Self::A),
            b'C' | b'c' => Ok(Self::C),
            b'G' | b'g' => Ok(Self::G),
            b'T' | b't' => Ok(Self::T),
            b'N' | b'n' => Ok(Self::N),
            _ => Err(anyhow!(
                "Invalid nucleotide character '{}'",
                c.escape_ascii()
            )),
        }
    }

    #[inline]
    fn from_bits(x: u64) -> Self {
        match x & 3 {
            0 => Self::A,
            1 => Self::C,
            2 => Self::G,
            _ => Self::T,
        }
    }

    /// 2 bit code. N has no code of its own and is packed as A
    #[inline]
    pub fn bits(self) -> u64 {
        match self {
            Self::N => 0,
            b => b as u64,
        }
    }

    /// The base as it reads back from a packed kmer
    #[inline]
    pub fn packed(self) -> Self {
        match self {
            Self::N => Self::A,
            b => b,
        }
    }

    #[inline]
    pub fn complement(self) -> Self {
        match self {
            Self::A => Self::T,
            Self::C => Self::G,
            Self::G => Self::C,
            Self::T => Self::A,
            Self::N => Self::N,
        }
    }

    #[inline]
    pub fn to_u8(self) -> u8 {
        b"ACGTN"[self as usize]
    }

    #[inline]
    pub fn is_gap(&self) -> bool {
        *self == Self::N
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KmerRepr {
    Forward,
    Reverse,
    Canon,
}

/// The last `k` bases seen, packed 2 bits per base.
///
/// `fwd` has the newest base in the lowest bits, `rev` holds the reverse complement
/// (so the complement of the newest base sits in the highest used bits).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kmer {
    k: usize,
    fwd: u64,
    rev: u64,
    mask: u64,
    n_count: usize,
}

impl Kmer {
    pub fn new(k: usize) -> Self {
        assert!(
            k > 0 && k <= MAX_KMER_LENGTH,
            "Kmer length must be between 1 and {MAX_KMER_LENGTH}"
        );
        const ZERO: u64 = 0;
        Self {
            k,
            fwd: 0,
            rev: 0,
            mask: (!ZERO) >> (64 - k - k),
            n_count: 0,
        }
    }

    #[cfg(test)]
    pub fn from_bases(s: &[u8]) -> anyhow::Result<Self> {
        let mut kmer = Self::new(s.len());
        for c in s {
            kmer.roll(Base::from_u8(*c)?)
        }
        Ok(kmer)
    }

    #[inline]
    fn rev_shift(&self) -> usize {
        (self.k - 1) << 1
    }

    #[inline]
    pub fn roll(&mut self, base: Base) {
        let x = base.bits();
        self.fwd = ((self.fwd << 2) & self.mask) | x;
        self.rev = (self.rev >> 2) | ((3 - x) << self.rev_shift());
        self.n_count += 1;
    }

    #[cfg(test)]
    pub fn roll_char(&mut self, c: u8) -> anyhow::Result<()> {
        self.roll(Base::from_u8(c)?);
        Ok(())
    }

    pub fn reset(&mut self) {
        self.fwd = 0;
        self.rev = 0;
        self.n_count = 0;
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.k
    }

    /// Number of valid positions in the window
    #[inline]
    pub fn available(&self) -> usize {
        self.n_count.min(self.k)
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.n_count >= self.k
    }

    /// True if the reverse complement is strictly smaller than the forward kmer
    #[inline]
    pub fn uses_reverse(&self) -> bool {
        self.rev < self.fwd
    }

    #[inline]
    pub fn data(&self, repr: KmerRepr) -> u64 {
        match repr {
            KmerRepr::Forward => self.fwd,
            KmerRepr::Reverse => self.rev,
            KmerRepr::Canon => self.fwd.min(self.rev),
        }
    }

    /// Base at position `i` of the chosen representation, counting from the right.
    /// Positions not yet filled read as N.
    pub fn get(&self, i: usize, repr: KmerRepr) -> Base {
        let avail = self.available();
        let filled = match repr {
            KmerRepr::Forward => i < avail,
            KmerRepr::Reverse => i < self.k && i >= self.k - avail,
            KmerRepr::Canon => {
                return if self.uses_reverse() {
                    self.get(i, KmerRepr::Reverse)
                } else {
                    self.get(i, KmerRepr::Forward)
                }
            }
        };
        if filled {
            Base::from_bits(self.data(repr) >> (i << 1))
        } else {
            Base::N
        }
    }

    /// Oldest base in the window (the one rolled out by the next roll)
    #[inline]
    pub fn last(&self) -> Base {
        self.get(self.k - 1, KmerRepr::Forward)
    }

    pub fn to_string_repr(&self, repr: KmerRepr) -> String {
        (0..self.k)
            .rev()
            .map(|i| self.get(i, repr).to_u8() as char)
            .collect()
    }
}

impl fmt::Display for Kmer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_repr(KmerRepr::Forward))
    }
}
