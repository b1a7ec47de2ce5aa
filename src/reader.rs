use std::{
    io::BufRead,
    path::{Path, PathBuf},
};
#[cfg(test)]
use std::{io::Cursor, sync::Arc};

use anyhow::Context;
use compress_io::compress::CompressIo;

/// A stream of sequences delivered one base at a time
pub trait SequenceSource {
    /// Move to the next sequence. Returns false when the input is exhausted.
    fn next_sequence(&mut self) -> anyhow::Result<bool>;

    /// Header of the current sequence (without the leading '>')
    fn header(&self) -> &str;

    /// Next base of the current sequence, or None at the end of the sequence
    fn next_base(&mut self) -> anyhow::Result<Option<u8>>;

    /// Go back to the start of the input
    fn rewind(&mut self) -> anyhow::Result<()>;
}

enum Source {
    Path(PathBuf),
    #[cfg(test)]
    Memory(Arc<[u8]>),
}

impl Source {
    fn open(&self) -> anyhow::Result<Box<dyn BufRead>> {
        match self {
            Self::Path(p) => {
                debug!("Opening {} for input", p.display());
                let rdr = CompressIo::new()
                    .path(p)
                    .bufreader()
                    .with_context(|| format!("Could not open input file {}", p.display()))?;
                Ok(Box::new(rdr))
            }
            #[cfg(test)]
            Self::Memory(b) => Ok(Box::new(Cursor::new(b.clone()))),
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum RdrState {
    Start,
    InSeq,
    EndSeq,
    Eof,
}

pub struct FastaReader {
    src: Source,
    rdr: Box<dyn BufRead>,
    state: RdrState,
    header: String,
}

impl FastaReader {
    fn new(src: Source) -> anyhow::Result<Self> {
        let rdr = src.open()?;
        Ok(Self {
            src,
            rdr,
            state: RdrState::Start,
            header: String::new(),
        })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Self::new(Source::Path(path.as_ref().to_owned()))
    }

    #[cfg(test)]
    pub fn from_bytes<T: Into<Vec<u8>>>(data: T) -> Self {
        let data: Arc<[u8]> = Arc::from(data.into());
        Self {
            rdr: Box::new(Cursor::new(data.clone())),
            src: Source::Memory(data),
            state: RdrState::Start,
            header: String::new(),
        }
    }

    /// Look at the next byte after skipping whitespace without consuming it
    fn peek_graphic(&mut self) -> anyhow::Result<Option<u8>> {
        loop {
            let buf = self
                .rdr
                .fill_buf()
                .with_context(|| "Error reading input")?;
            if buf.is_empty() {
                return Ok(None);
            }
            let skip = buf.iter().take_while(|c| c.is_ascii_whitespace()).count();
            if skip < buf.len() {
                let c = buf[skip];
                self.rdr.consume(skip);
                return Ok(Some(c));
            }
            let l = buf.len();
            self.rdr.consume(l);
        }
    }

    fn read_header(&mut self) -> anyhow::Result<()> {
        // Skip '>'
        self.rdr.consume(1);
        self.header.clear();
        self.rdr
            .read_line(&mut self.header)
            .with_context(|| "Error reading sequence header")?;
        let l = self.header.trim_end().len();
        self.header.truncate(l);
        Ok(())
    }
}

impl SequenceSource for FastaReader {
    fn next_sequence(&mut self) -> anyhow::Result<bool> {
        // Skip whatever is left of the current sequence
        while self.state == RdrState::InSeq {
            self.next_base()?;
        }
        if self.state == RdrState::Eof {
            return Ok(false);
        }
        match self.peek_graphic()? {
            None => {
                self.state = RdrState::Eof;
                Ok(false)
            }
            Some(b'>') => {
                self.read_header()?;
                trace!("Starting sequence {}", self.header);
                self.state = RdrState::InSeq;
                Ok(true)
            }
            Some(_) => Err(anyhow!("Bad FASTA format: expecting '>'")),
        }
    }

    fn header(&self) -> &str {
        &self.header
    }

    fn next_base(&mut self) -> anyhow::Result<Option<u8>> {
        if self.state != RdrState::InSeq {
            return Ok(None);
        }
        match self.peek_graphic()? {
            None => {
                self.state = RdrState::Eof;
                Ok(None)
            }
            Some(b'>') => {
                self.state = RdrState::EndSeq;
                Ok(None)
            }
            Some(c) => {
                self.rdr.consume(1);
                Ok(Some(c))
            }
        }
    }

    fn rewind(&mut self) -> anyhow::Result<()> {
        self.rdr = self.src.open()?;
        self.state = RdrState::Start;
        self.header.clear();
        Ok(())
    }
}
