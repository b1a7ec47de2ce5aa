use std::{collections::HashSet, fmt, io::Write};

use serde::Serialize;

use super::{KmerParams, PhaseStats};
use crate::{
    kmers::{Base, Kmer},
    reader::SequenceSource,
    writer::KmerWriter,
};

/// Reference masked superstring: every first occurrence of a kmer is marked
/// present, using an exact set of packed kmers.
pub fn compute_superstring<S: SequenceSource, W: Write>(
    input: &mut S,
    out: &mut KmerWriter<W>,
    params: KmerParams,
) -> anyhow::Result<PhaseStats> {
    let k = params.k();
    let repr = params.repr();
    let mut kmer_set: HashSet<u64> = HashSet::new();
    let mut kmer = Kmer::new(k);
    let mut stats = PhaseStats::default();

    input.rewind()?;
    while input.next_sequence()? {
        trace!("Exact: {}", input.header());
        out.write_header(input.header())?;
        kmer.reset();
        while let Some(c) = input.next_base()? {
            let base = Base::from_u8(c)?;
            kmer.roll(base);
            out.add_base(base);
            if kmer.is_full() {
                let present = kmer_set.insert(kmer.data(repr));
                if present {
                    stats.present += 1
                }
                stats.kmers += 1;
                out.print_base(present)?;
            }
        }
        out.flush()?;
    }
    debug!("Exact set holds {} kmers", kmer_set.len());
    Ok(stats)
}

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Serialize)]
pub struct Accuracy {
    pub missing_kmers: usize,
    pub additional_kmers: usize,
    pub length: usize,
}

impl Accuracy {
    fn percent(&self, x: usize) -> f64 {
        if self.length > 0 {
            100.0 * x as f64 / self.length as f64
        } else {
            0.0
        }
    }
}

impl fmt::Display for Accuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Missing kmers: {} / {} ({:.4}%)",
            self.missing_kmers,
            self.length,
            self.percent(self.missing_kmers)
        )?;
        writeln!(
            f,
            "Additional kmers: {} / {} ({:.4}%)",
            self.additional_kmers,
            self.length,
            self.percent(self.additional_kmers)
        )
    }
}

/// Compare the presence masks of two masked superstrings record by record.
///
/// Only positions present in both records are compared, and comparison stops
/// when either input runs out of records.
pub fn compute_accuracy<S: SequenceSource, T: SequenceSource>(
    output: &mut S,
    golden: &mut T,
) -> anyhow::Result<Accuracy> {
    let mut acc = Accuracy::default();
    output.rewind()?;
    golden.rewind()?;
    while output.next_sequence()? && golden.next_sequence()? {
        if output.header() != golden.header() {
            warn!(
                "Comparing records with different headers: '{}' and '{}'",
                output.header(),
                golden.header()
            )
        }
        while let (Some(a), Some(b)) = (output.next_base()?, golden.next_base()?) {
            match (a.is_ascii_uppercase(), b.is_ascii_uppercase()) {
                (true, false) => acc.additional_kmers += 1,
                (false, true) => acc.missing_kmers += 1,
                _ => (),
            }
            acc.length += 1;
        }
    }
    Ok(acc)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::reader::FastaReader;

    #[test]
    fn exact_canonical() {
        // TTGC is the reverse complement of GCAA
        let mut rdr = FastaReader::from_bytes(">x\nGCAAgcaa\n>y\nnTTGCAA\n");
        let mut out = KmerWriter::new(Vec::new(), 4, false);
        let params = KmerParams::new(4, 10, false, false);
        let stats = compute_superstring(&mut rdr, &mut out, params).unwrap();
        let s = String::from_utf8(out.finish().unwrap()).unwrap();
        // TGCA is its own reverse complement
        assert_eq!(s, ">x\nGCAAgcaa\n>y\nNtTgcaa\n");
        assert_eq!(stats.kmers, 9);
        assert_eq!(stats.present, 6);
    }

    #[test]
    fn accuracy() {
        let mut a = FastaReader::from_bytes(">a\nACgtA\n>b\nAA\n>c\nGG");
        let mut b = FastaReader::from_bytes(">a\nAcGTa\n>b\naAc\n");
        let acc = compute_accuracy(&mut a, &mut b).unwrap();
        assert_eq!(
            acc,
            Accuracy {
                missing_kmers: 2,
                additional_kmers: 3,
                length: 7
            }
        );
        let s = acc.to_string();
        assert!(s.starts_with("Missing kmers: 2 / 7 (28.5714%)\n"));
        assert!(s.ends_with("Additional kmers: 3 / 7 (42.8571%)\n"));

        let acc = Accuracy::default();
        assert_eq!(acc.percent(0), 0.0);
    }
}
