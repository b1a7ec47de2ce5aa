use std::io::Write;

use super::{KmerParams, PhaseStats};
use crate::{
    hash::RollingHashFamily, kmers::Base, reader::SequenceSource,
    sketch::RollingCountingBloomFilter, writer::KmerWriter,
};

/// Case flags of the last `k` bases, the oldest in bit `k - 1`
struct CaseWindow {
    flags: u64,
    mask: u64,
    k: usize,
    filled: usize,
}

impl CaseWindow {
    fn new(k: usize) -> Self {
        Self {
            flags: 0,
            mask: (1 << k) - 1,
            k,
            filled: 0,
        }
    }

    fn reset(&mut self) {
        self.flags = 0;
        self.filled = 0;
    }

    /// Push the next character. Once the window is full, returns whether the
    /// kmer starting at the oldest base was marked present (upper case).
    fn push(&mut self, c: u8) -> Option<bool> {
        self.flags = ((self.flags << 1) | c.is_ascii_uppercase() as u64) & self.mask;
        self.filled += 1;
        if self.filled >= self.k {
            Some((self.flags >> (self.k - 1)) & 1 != 0)
        } else {
            None
        }
    }
}

/// Run over every full kmer window of the input, calling `f` with the filter
/// positioned on the window and the case flag of the window
fn scan<H, S, F>(
    input: &mut S,
    filter: &mut RollingCountingBloomFilter<H>,
    k: usize,
    mut f: F,
) -> anyhow::Result<()>
where
    H: RollingHashFamily,
    S: SequenceSource,
    F: FnMut(&mut RollingCountingBloomFilter<H>, bool),
{
    let mut window = CaseWindow::new(k);
    input.rewind()?;
    while input.next_sequence()? {
        filter.reset_hash_family();
        window.reset();
        while let Some(c) = input.next_base()? {
            filter.roll(Base::from_u8(c)?);
            if let Some(upper) = window.push(c) {
                f(filter, upper)
            }
        }
    }
    Ok(())
}

/// Phase 2: correct the false positives of phase 1 using a counting Bloom filter.
///
/// The filter is loaded with the kmers phase 1 marked absent, then the kmers it
/// marked present are removed. What remains are kmers that were never marked
/// present, which are credited at their first occurrence on the final pass.
pub fn compute_superstring<H, S, W>(
    approx_set_size: usize,
    input: &mut S,
    out: &mut KmerWriter<W>,
    params: KmerParams,
) -> anyhow::Result<PhaseStats>
where
    H: RollingHashFamily,
    S: SequenceSource,
    W: Write,
{
    let k = params.k();
    let mut filter = RollingCountingBloomFilter::<H>::optimal(
        approx_set_size,
        params.bits_per_element(),
        k,
        params.repr(),
    );
    debug!(
        "Second phase: counting Bloom filter with {} counters of 4 bits and {} hashes",
        filter.size(),
        filter.nhashes()
    );

    debug!("Second phase: loading absent kmers");
    scan(input, &mut filter, k, |f, upper| {
        if !upper {
            f.insert_this()
        }
    })?;

    debug!("Second phase: removing present kmers");
    scan(input, &mut filter, k, |f, upper| {
        if upper {
            f.erase_this()
        }
    })?;

    debug!("Second phase: writing output");
    let mut stats = PhaseStats::default();
    let mut window = CaseWindow::new(k);
    input.rewind()?;
    while input.next_sequence()? {
        trace!("Second phase: {}", input.header());
        out.write_header(input.header())?;
        filter.reset_hash_family();
        window.reset();
        while let Some(c) = input.next_base()? {
            let base = Base::from_u8(c)?;
            filter.roll(base);
            out.add_base(base);
            if let Some(upper) = window.push(c) {
                let present = upper || filter.contains_this();
                if present {
                    stats.present += 1;
                    if !upper {
                        // credit the kmer once
                        filter.erase_this()
                    }
                }
                stats.kmers += 1;
                out.print_base(present)?;
            }
        }
        out.flush()?;
    }
    debug!(
        "Second phase: {} of {} kmers marked present",
        stats.present, stats.kmers
    );
    Ok(stats)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn case_window() {
        let mut w = CaseWindow::new(3);
        let res: Vec<_> = b"AcgTtGA".iter().map(|c| w.push(*c)).collect();
        assert_eq!(
            res,
            [None, None, Some(true), Some(false), Some(false), Some(true), Some(false)]
        );
        w.reset();
        assert_eq!(w.push(b'A'), None);
    }
}
