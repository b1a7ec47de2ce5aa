use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::{
    cli::{CompareConfig, ComputeConfig, ExactConfig},
    hash::{MurmurHashFamily, PolyHashFamily},
    kmers::KmerRepr,
    reader::FastaReader,
    writer::KmerWriter,
};

mod approximate_count;
pub mod exact;
mod first_phase;
mod second_phase;

pub use approximate_count::{approximate_count, Stats};
pub use exact::Accuracy;

/// Kmer and sketch parameters shared by all phases
#[derive(Debug, Copy, Clone, Serialize)]
pub struct KmerParams {
    k: usize,
    bits_per_element: usize,
    unidirectional: bool,
    splice: bool,
}

impl KmerParams {
    pub fn new(k: usize, bits_per_element: usize, unidirectional: bool, splice: bool) -> Self {
        Self {
            k,
            bits_per_element,
            unidirectional,
            splice,
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn bits_per_element(&self) -> usize {
        self.bits_per_element
    }

    pub fn repr(&self) -> KmerRepr {
        if self.unidirectional {
            KmerRepr::Forward
        } else {
            KmerRepr::Canon
        }
    }

    pub fn splice(&self) -> bool {
        self.splice
    }
}

/// Kmer decisions taken by one pass producing a masked superstring
#[derive(Debug, Default, Copy, Clone, Serialize)]
pub struct PhaseStats {
    pub kmers: u64,
    pub present: u64,
}

#[derive(Debug, Serialize)]
pub struct ComputeResults {
    count: Stats,
    approximate_duplicates: usize,
    first_phase: PhaseStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    second_phase: Option<PhaseStats>,
    bases_written: u64,
}

/// Destination of the first phase output when the second phase runs
enum TempOutput {
    /// Path given with `--temp`, left in place after the run
    User(PathBuf),
    /// Freshly created file, removed when dropped
    Generated(NamedTempFile),
}

impl TempOutput {
    fn new(cfg: &ComputeConfig) -> anyhow::Result<Self> {
        match cfg.temp() {
            Some(p) => Ok(Self::User(p.to_owned())),
            None => Self::generate(cfg.output(), std::env::temp_dir()),
        }
    }

    /// Create a new `{output stem}-XXXXXX.tmp` file in `dir`. Existing files are never reused
    fn generate<P: AsRef<Path>>(output: &Path, dir: P) -> anyhow::Result<Self> {
        let dir = dir.as_ref();
        let stem = output
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("superstring");
        let file = tempfile::Builder::new()
            .prefix(&format!("{stem}-"))
            .suffix(".tmp")
            .tempfile_in(dir)
            .with_context(|| format!("Could not create temporary file in {}", dir.display()))?;
        debug!("Temporary file {}", file.path().display());
        Ok(Self::Generated(file))
    }

    fn path(&self) -> &Path {
        match self {
            Self::User(p) => p.as_path(),
            Self::Generated(f) => f.path(),
        }
    }

    fn close(self) {
        if let Self::Generated(f) = self {
            let path = f.path().to_owned();
            debug!("Removing temporary file {}", path.display());
            if let Err(e) = f.close() {
                warn!("Could not remove temporary file {}: {e}", path.display())
            }
        }
    }
}

/// Approximate masked superstring: cardinality estimate, Bloom filter pass and,
/// unless disabled, the counting Bloom filter correction.
pub fn compute(cfg: &ComputeConfig) -> anyhow::Result<ComputeResults> {
    let params = cfg.params();
    let k = params.k();
    let mut input = FastaReader::open(cfg.input())?;

    info!("Estimating number of distinct kmers");
    let count = approximate_count::<MurmurHashFamily, _>(&mut input, params)?;
    let approximate_duplicates = count.approximate_duplicates(k);
    info!(
        "Read {} sequences with {} bases: approx. {} distinct kmers",
        count.sequence_count, count.total_length, count.approximate_kmer_count
    );
    debug!("Approximate number of duplicate kmers: {approximate_duplicates}");

    let results = if cfg.second_phase() {
        let temp = TempOutput::new(cfg)?;

        info!("Starting first phase");
        let mut out = KmerWriter::create(temp.path(), k, false)?;
        let first_phase = first_phase::compute_superstring::<PolyHashFamily, _, _>(
            count.approximate_kmer_count,
            &mut input,
            &mut out,
            params,
        )?;
        out.finish()?;

        info!("Starting second phase");
        let mut tmp_input = FastaReader::open(temp.path())?;
        let mut out = KmerWriter::create(cfg.output(), k, params.splice())?;
        let second_phase = second_phase::compute_superstring::<PolyHashFamily, _, _>(
            approximate_duplicates,
            &mut tmp_input,
            &mut out,
            params,
        )?;
        let bases_written = out.written();
        out.finish()?;
        drop(tmp_input);
        temp.close();
        ComputeResults {
            count,
            approximate_duplicates,
            first_phase,
            second_phase: Some(second_phase),
            bases_written,
        }
    } else {
        info!("Starting first phase");
        let mut out = KmerWriter::create(cfg.output(), k, params.splice())?;
        let first_phase = first_phase::compute_superstring::<PolyHashFamily, _, _>(
            count.approximate_kmer_count,
            &mut input,
            &mut out,
            params,
        )?;
        let bases_written = out.written();
        out.finish()?;
        ComputeResults {
            count,
            approximate_duplicates,
            first_phase,
            second_phase: None,
            bases_written,
        }
    };
    info!(
        "Finished: {} bases written to {}",
        results.bases_written,
        cfg.output().display()
    );
    Ok(results)
}

pub fn compute_exact(cfg: &ExactConfig) -> anyhow::Result<PhaseStats> {
    let params = cfg.params();
    let mut input = FastaReader::open(cfg.input())?;
    let mut out = KmerWriter::create(cfg.output(), params.k(), params.splice())?;
    info!("Computing exact masked superstring");
    let stats = exact::compute_superstring(&mut input, &mut out, params)?;
    out.finish()
        .with_context(|| format!("Error writing {}", cfg.output().display()))?;
    info!(
        "Finished: {} distinct kmers out of {}",
        stats.present, stats.kmers
    );
    Ok(stats)
}

pub fn compare(cfg: &CompareConfig) -> anyhow::Result<Accuracy> {
    let mut output = FastaReader::open(cfg.output())?;
    let mut golden = FastaReader::open(cfg.golden())?;
    exact::compute_accuracy(&mut output, &mut golden)
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::cli::{test::parse, Task};
    use tempfile::TempDir;

    /// Run `compute` with `-k 4 -b 64 -u` on a single record, returning the output text
    pub fn run_compute(dir: &Path, opts: &[&str]) -> (ComputeConfig, ComputeResults, String) {
        let input = dir.join("in.fa");
        std::fs::write(&input, ">seq1\nACGTACGTACGT\n").unwrap();
        let output = dir.join("out.fa");
        let mut args = vec!["prog", "compute", "-k", "4", "-b", "64", "-u"];
        args.extend_from_slice(opts);
        args.push(input.to_str().unwrap());
        args.push(output.to_str().unwrap());
        let cfg = match parse(&args) {
            Task::Compute(cfg) => cfg,
            _ => panic!("Expected compute task"),
        };
        let res = compute(&cfg).unwrap();
        let s = std::fs::read_to_string(&output).unwrap();
        (cfg, res, s)
    }

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut v: Vec<_> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        v.sort();
        v
    }

    fn run_first_phase(input: &str, approx_set_size: usize, params: KmerParams) -> String {
        let mut rdr = FastaReader::from_bytes(input);
        let mut out = KmerWriter::new(Vec::new(), params.k(), params.splice());
        first_phase::compute_superstring::<PolyHashFamily, _, _>(
            approx_set_size,
            &mut rdr,
            &mut out,
            params,
        )
        .unwrap();
        String::from_utf8(out.finish().unwrap()).unwrap()
    }

    fn run_exact(input: &str, params: KmerParams) -> String {
        let mut rdr = FastaReader::from_bytes(input);
        let mut out = KmerWriter::new(Vec::new(), params.k(), params.splice());
        exact::compute_superstring(&mut rdr, &mut out, params).unwrap();
        String::from_utf8(out.finish().unwrap()).unwrap()
    }

    #[test]
    fn first_phase_end_to_end() {
        let input = ">seq1\nACGTACGTACGT\n";
        let params = KmerParams::new(4, 64, true, false);
        let mut rdr = FastaReader::from_bytes(input);
        let stats = approximate_count::<MurmurHashFamily, _>(&mut rdr, params).unwrap();
        assert_eq!(stats.approximate_kmer_count, 4);
        assert_eq!(stats.approximate_duplicates(4), 5);

        let s = run_first_phase(input, stats.approximate_kmer_count, params);
        assert_eq!(s, ">seq1\nACGTacgtacgt\n");
        assert_eq!(s, run_exact(input, params));
    }

    #[test]
    fn splice_drops_absent_runs() {
        let input = ">seq1\nACGTACGTACGT\n";
        let params = KmerParams::new(4, 64, true, true);
        let s = run_first_phase(input, 4, params);
        assert_eq!(s, ">seq1\nACGTacg\n");
    }

    #[test]
    fn short_sequences() {
        let input = ">a\nAC\n>b\n\n>c\nacgtt\n";
        let params = KmerParams::new(4, 64, false, false);
        let s = run_first_phase(input, 10, params);
        assert_eq!(s, ">a\nac\n>b\n\n>c\nACgtt\n");
        assert_eq!(s, run_exact(input, params));
    }

    #[test]
    fn invalid_character_is_fatal() {
        let params = KmerParams::new(3, 10, false, false);
        let mut rdr = FastaReader::from_bytes(">a\nACGXT\n");
        let mut out = KmerWriter::new(Vec::new(), 3, false);
        let res = first_phase::compute_superstring::<PolyHashFamily, _, _>(
            10, &mut rdr, &mut out, params,
        );
        assert!(res.is_err());
        let mut rdr = FastaReader::from_bytes(">a\nACGXT\n");
        assert!(approximate_count::<MurmurHashFamily, _>(&mut rdr, params).is_err());
    }

    #[test]
    fn second_phase_recovers_exact() {
        // repeats within and across records, the second record also holds the
        // reverse complement of part of the first
        let input = ">s1\n\
            AGCAGTATCATGCTATCTATGGCACAAATGGACATTATTTCTTGGGATTGAAAGAAGGGACGCTCTTGGGATTGAAAG\n\
            >s2\n\
            TTGGAAGGTCGTTAGTGTCTTGGGATTGAAAGAAGGGACGCTCTTGGGATTGAAAGCATTTGTGCCATAGATAGCATGATA\n\
            >s3\n\
            CCGAGGGTCTCATAGATCCAGTTTAACGCCTTGGATTGAGAGACAACTGCCTTGGGATTGAAAGAAGGGACGCTCTTGGGATTGAAAG\n";
        let k = 11;

        for (unidirectional, n_present) in [(true, 155), (false, 140)] {
            // A one bit filter: only the very first kmer is marked present
            let first = run_first_phase(input, 1, KmerParams::new(k, 1, unidirectional, false));
            assert_eq!(first.bytes().filter(|c| c.is_ascii_uppercase()).count(), 1);

            let params = KmerParams::new(k, 16, unidirectional, false);
            let mut rdr = FastaReader::from_bytes(first.as_str());
            let mut out = KmerWriter::new(Vec::new(), k, false);
            let stats = second_phase::compute_superstring::<PolyHashFamily, _, _>(
                1000, &mut rdr, &mut out, params,
            )
            .unwrap();
            let second = String::from_utf8(out.finish().unwrap()).unwrap();
            let expected = run_exact(input, params);
            assert_eq!(second, expected);
            assert_eq!(stats.present, n_present);
            assert_eq!(stats.kmers, 217);

            let mut a = FastaReader::from_bytes(second);
            let mut b = FastaReader::from_bytes(expected.as_str());
            let acc = exact::compute_accuracy(&mut a, &mut b).unwrap();
            assert_eq!(acc.missing_kmers, 0);
            assert_eq!(acc.additional_kmers, 0);
            assert_eq!(acc.length, 217 + 3 * (k - 1));

            // the phase 1 output misses everything but the first kmer
            let mut a = FastaReader::from_bytes(first);
            let mut b = FastaReader::from_bytes(run_exact(input, params));
            let acc = exact::compute_accuracy(&mut a, &mut b).unwrap();
            assert_eq!(acc.missing_kmers, n_present as usize - 1);
            assert_eq!(acc.additional_kmers, 0);
        }
    }

    #[test]
    fn generated_temp_file_is_fresh_and_removed() {
        let dir = TempDir::new().unwrap();
        let existing = dir.path().join("out-00001.tmp");
        std::fs::write(&existing, "precious").unwrap();

        let temp = TempOutput::generate(Path::new("results/out.fa"), dir.path()).unwrap();
        let path = temp.path().to_owned();
        let name = path.file_name().unwrap().to_str().unwrap().to_owned();
        assert!(name.starts_with("out-") && name.ends_with(".tmp"), "{name}");
        assert_ne!(path, existing);
        std::fs::write(&path, ">x\nacgt\n").unwrap();
        temp.close();
        assert!(!path.exists());

        // dropped without close, as on an error path
        let temp = TempOutput::generate(Path::new("out.fa"), dir.path()).unwrap();
        let path = temp.path().to_owned();
        assert!(path.exists());
        drop(temp);
        assert!(!path.exists());

        assert_eq!(dir_entries(dir.path()), ["out-00001.tmp"]);
        assert_eq!(std::fs::read_to_string(&existing).unwrap(), "precious");
    }

    #[test]
    fn compute_with_second_phase() {
        let dir = TempDir::new().unwrap();
        let (_, res, s) = run_compute(dir.path(), &[]);
        assert_eq!(s, ">seq1\nACGTacg\n");
        assert_eq!(res.count.approximate_kmer_count, 4);
        assert_eq!(res.approximate_duplicates, 5);
        assert_eq!(res.first_phase.present, 4);
        let second = res.second_phase.unwrap();
        assert_eq!((second.kmers, second.present), (9, 4));
        assert_eq!(res.bases_written, 7);
        assert_eq!(dir_entries(dir.path()), ["in.fa", "out.fa"]);

        let (_, res, s) = run_compute(dir.path(), &["-s"]);
        assert_eq!(s, ">seq1\nACGTacgtacgt\n");
        assert_eq!(res.bases_written, 12);
    }

    #[test]
    fn compute_keeps_user_temp_unspliced() {
        let dir = TempDir::new().unwrap();
        let temp = dir.path().join("first.fa");
        let (cfg, _, s) = run_compute(dir.path(), &["-t", temp.to_str().unwrap()]);
        assert_eq!(cfg.temp(), Some(temp.as_path()));
        assert_eq!(s, ">seq1\nACGTacg\n");
        // splicing only applies to the final output
        assert_eq!(
            std::fs::read_to_string(&temp).unwrap(),
            ">seq1\nACGTacgtacgt\n"
        );
    }

    #[test]
    fn compute_first_phase_only() {
        let dir = TempDir::new().unwrap();
        let (cfg, res, s) = run_compute(dir.path(), &["-f"]);
        assert!(!cfg.second_phase());
        assert_eq!(s, ">seq1\nACGTacg\n");
        assert!(res.second_phase.is_none());
        assert_eq!((res.first_phase.kmers, res.first_phase.present), (9, 4));
        assert_eq!(res.bases_written, 7);
        assert_eq!(dir_entries(dir.path()), ["in.fa", "out.fa"]);
    }
}
