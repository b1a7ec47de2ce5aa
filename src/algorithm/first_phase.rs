use std::io::Write;

use super::{KmerParams, PhaseStats};
use crate::{
    hash::RollingHashFamily, kmers::Base, reader::SequenceSource, sketch::RollingBloomFilter,
    writer::KmerWriter,
};

/// Phase 1: mark a kmer present unless the Bloom filter has already seen it.
///
/// Bloom filters have no false negatives, so every true first occurrence is
/// marked; false positives show up as first occurrences marked absent.
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
    let mut filter = RollingBloomFilter::<H>::optimal(
        approx_set_size,
        params.bits_per_element(),
        k,
        params.repr(),
    );
    debug!(
        "First phase: Bloom filter with {} bits and {} hashes",
        filter.size(),
        filter.nhashes()
    );
    let mut stats = PhaseStats::default();

    input.rewind()?;
    while input.next_sequence()? {
        trace!("First phase: {}", input.header());
        out.write_header(input.header())?;
        filter.reset_hash_family();
        let mut read = 0;
        while let Some(c) = input.next_base()? {
            let base = Base::from_u8(c)?;
            filter.roll(base);
            out.add_base(base);
            read += 1;
            if read < k {
                continue;
            }
            let present = !filter.contains_this();
            if present {
                filter.insert_this();
                stats.present += 1;
            }
            stats.kmers += 1;
            out.print_base(present)?;
        }
        out.flush()?;
    }
    debug!(
        "First phase: {} of {} kmers marked present, filter occupancy {:.3}",
        stats.present,
        stats.kmers,
        filter.occupancy()
    );
    Ok(stats)
}
