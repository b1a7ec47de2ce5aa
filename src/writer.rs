use std::{collections::VecDeque, io::Write, path::Path};

use anyhow::Context;
use compress_io::compress::CompressIo;

use crate::kmers::Base;

/// Writes a masked superstring, one record per input sequence.
///
/// Bases are buffered in a window of `k`; `print_base` emits the oldest one,
/// upper case if the kmer starting there is present. In splice mode a base is
/// only written if it belongs to a present kmer, i.e. it lies less than `k`
/// positions after the last present base.
pub struct KmerWriter<W: Write> {
    w: W,
    k: usize,
    window: VecDeque<Base>,
    splice: bool,
    since_present: usize,
    written: u64,
}

impl KmerWriter<Box<dyn Write>> {
    pub fn create<P: AsRef<Path>>(path: P, k: usize, splice: bool) -> anyhow::Result<Self> {
        let path = path.as_ref();
        debug!("Opening {} for output", path.display());
        let w = CompressIo::new()
            .path(path)
            .bufwriter()
            .with_context(|| format!("Could not open output file {}", path.display()))?;
        Ok(Self::new(Box::new(w), k, splice))
    }
}

impl<W: Write> KmerWriter<W> {
    pub fn new(w: W, k: usize, splice: bool) -> Self {
        assert!(k > 0);
        Self {
            w,
            k,
            window: VecDeque::with_capacity(k),
            splice,
            since_present: k,
            written: 0,
        }
    }

    pub fn write_header(&mut self, header: &str) -> anyhow::Result<()> {
        self.window.clear();
        self.since_present = self.k;
        writeln!(self.w, ">{header}").with_context(|| "Error writing sequence header")
    }

    #[inline]
    pub fn add_base(&mut self, base: Base) {
        self.window.push_back(base)
    }

    pub fn print_base(&mut self, present: bool) -> anyhow::Result<()> {
        let base = self
            .window
            .pop_front()
            .ok_or_else(|| anyhow!("No buffered base to print"))?
            .to_u8();
        let c = if present {
            self.since_present = 0;
            base
        } else {
            base.to_ascii_lowercase()
        };
        if !self.splice || self.since_present < self.k {
            self.w
                .write_all(&[c])
                .with_context(|| "Error writing output")?;
            self.written += 1;
        }
        self.since_present = self.since_present.saturating_add(1);
        Ok(())
    }

    /// Emit the buffered tail of the sequence as absent and end the record
    pub fn flush(&mut self) -> anyhow::Result<()> {
        while !self.window.is_empty() {
            self.print_base(false)?
        }
        writeln!(self.w).with_context(|| "Error writing output")
    }

    /// Number of bases written so far
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn finish(mut self) -> anyhow::Result<W> {
        self.w.flush().with_context(|| "Error flushing output")?;
        Ok(self.w)
    }
}
