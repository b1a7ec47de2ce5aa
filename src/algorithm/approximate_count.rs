use serde::Serialize;

use super::KmerParams;
use crate::{
    hash::HashFamily,
    kmers::{Base, Kmer},
    reader::SequenceSource,
    sketch::HyperLogLog,
};

#[derive(Debug, Default, Copy, Clone, Serialize)]
pub struct Stats {
    pub approximate_kmer_count: usize,
    pub sequence_count: usize,
    pub total_length: usize,
    pub gap_count: usize,
}

impl Stats {
    /// Estimated number of kmer occurrences that repeat an earlier kmer
    pub fn approximate_duplicates(&self, k: usize) -> usize {
        self.total_length
            .saturating_sub(self.sequence_count.saturating_mul(k - 1))
            .saturating_sub(self.approximate_kmer_count)
    }
}

/// Phase 0: count sequences and bases, and estimate the number of distinct kmers
pub fn approximate_count<H: HashFamily, S: SequenceSource>(
    input: &mut S,
    params: KmerParams,
) -> anyhow::Result<Stats> {
    let k = params.k();
    let mut hll = HyperLogLog::<H>::new(k, params.repr());
    let mut stats = Stats::default();
    let mut kmer = Kmer::new(k);

    input.rewind()?;
    while input.next_sequence()? {
        trace!("Counting kmers in {}", input.header());
        stats.sequence_count += 1;
        kmer.reset();
        while let Some(c) = input.next_base()? {
            stats.total_length += 1;
            let base = Base::from_u8(c)?;
            if base.is_gap() {
                stats.gap_count += 1
            }
            kmer.roll(base);
            if kmer.is_full() {
                hll.update(&kmer)
            }
        }
    }
    stats.approximate_kmer_count = hll.query();
    if stats.gap_count > 0 {
        warn!(
            "Input has {} N bases: they are treated as A in kmers",
            stats.gap_count
        )
    }
    Ok(stats)
}
