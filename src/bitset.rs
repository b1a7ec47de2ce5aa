/// Fixed size bit array. Accesses past the end read as unset and writes are ignored
#[derive(Debug, Clone)]
pub struct DynamicBitset {
    size: usize,
    data: Vec<u64>,
}

impl DynamicBitset {
    const WORD_BITS: usize = u64::BITS as usize;

    pub fn new(size: usize) -> Self {
        Self {
            size,
            data: vec![0; size.div_ceil(Self::WORD_BITS)],
        }
    }

    #[inline]
    fn locate(&self, ind: usize) -> Option<(usize, u64)> {
        if ind < self.size {
            Some((ind / Self::WORD_BITS, 1 << (ind % Self::WORD_BITS)))
        } else {
            None
        }
    }

    #[inline]
    pub fn set(&mut self, ind: usize) {
        if let Some((w, bit)) = self.locate(ind) {
            self.data[w] |= bit
        }
    }

    #[inline]
    pub fn test(&self, ind: usize) -> bool {
        self.locate(ind)
            .map(|(w, bit)| self.data[w] & bit != 0)
            .unwrap_or(false)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn count_ones(&self) -> usize {
        self.data.iter().map(|w| w.count_ones() as usize).sum()
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Counter {
    Count(u32),
    /// Counter has reached its maximum and no longer moves
    Saturated,
}

/// Array of `BPC` bit counters packed into `u32` words.
///
/// Counters saturate at `2^BPC - 1`. A saturated counter is stuck: it is never
/// decremented, as it may hold more insertions than it can record.
#[derive(Debug, Clone)]
pub struct CountingBitset<const BPC: usize> {
    size: usize,
    data: Vec<u32>,
}

impl<const BPC: usize> CountingBitset<BPC> {
    const CELLS_PER_WORD: usize = u32::BITS as usize / BPC;
    const CELL_MASK: u32 = ((1u64 << BPC) - 1) as u32;
    pub const MAX_COUNT: u32 = Self::CELL_MASK;

    pub fn new(size: usize) -> Self {
        assert!(BPC > 0 && BPC <= 16, "Unsupported counter width");
        Self {
            size,
            data: vec![0; size.div_ceil(Self::CELLS_PER_WORD)],
        }
    }

    #[inline]
    fn locate(ind: usize) -> (usize, usize) {
        (
            ind / Self::CELLS_PER_WORD,
            (ind % Self::CELLS_PER_WORD) * BPC,
        )
    }

    #[inline]
    pub fn get(&self, ind: usize) -> u32 {
        assert!(ind < self.size, "Counter index out of range");
        let (w, off) = Self::locate(ind);
        (self.data[w] >> off) & Self::CELL_MASK
    }

    /// Set counter, clamping `count` to the maximum
    #[inline]
    pub fn set(&mut self, ind: usize, count: u32) {
        assert!(ind < self.size, "Counter index out of range");
        let (w, off) = Self::locate(ind);
        let count = count.min(Self::MAX_COUNT);
        self.data[w] = (self.data[w] & !(Self::CELL_MASK << off)) | (count << off);
    }

    #[inline]
    pub fn test(&self, ind: usize) -> bool {
        self.get(ind) > 0
    }

    #[inline]
    pub fn is_stuck(&self, ind: usize) -> bool {
        self.get(ind) == Self::MAX_COUNT
    }

    pub fn counter(&self, ind: usize) -> Counter {
        if self.is_stuck(ind) {
            Counter::Saturated
        } else {
            Counter::Count(self.get(ind))
        }
    }

    #[inline]
    pub fn increment(&mut self, ind: usize) {
        if let Counter::Count(x) = self.counter(ind) {
            self.set(ind, x + 1)
        }
    }

    /// No-op for empty and for stuck counters
    #[inline]
    pub fn decrement(&mut self, ind: usize) {
        if let Counter::Count(x) = self.counter(ind) {
            if x > 0 {
                self.set(ind, x - 1)
            }
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }
}
