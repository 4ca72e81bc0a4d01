//! Streaming chromosome reader
//!
//! Pulls characters from a FASTA-style source in fixed-size chunks and turns
//! them into amino acids one codon at a time. The first line of every source
//! is a header and is skipped.
//!
//! Stream content is never an error: `N` voids the partial codon, anything
//! outside the alphabet is skipped. Once the source runs dry the reader stays
//! exhausted until it is pointed at a source again.

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use super::amino::AminoAcid;
use super::nucleotide::{CodonBuffer, Symbol};
use crate::error::ReaderError;

/// Outcome of one decode attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    Amino(AminoAcid),
    /// The source is used up; repeats until the next reload
    Exhausted,
}

/// Where the current characters come from
#[derive(Debug, Clone)]
enum Origin {
    File(PathBuf),
    Text { name: String, text: Arc<[u8]> },
    Stream(String),
}

impl Origin {
    fn name(&self) -> String {
        match self {
            Origin::File(path) => path.display().to_string(),
            Origin::Text { name, .. } | Origin::Stream(name) => name.clone(),
        }
    }
}

/// Snapshot of reader progress for status replies
#[derive(Debug, Clone, PartialEq)]
pub struct ReaderStatus {
    pub source_name: String,
    pub bases_read: u64,
    pub amino_acids_read: u64,
    pub estimated_total_aminos: Option<u64>,
    pub has_next: bool,
}

pub struct ChromosomeReader {
    source: Box<dyn BufRead + Send>,
    origin: Origin,
    chunk: Vec<u8>,
    chunk_idx: usize,
    chunk_size: usize,
    buffer: CodonBuffer,
    more_coming: bool,
    bases_read: u64,
    amino_acids_read: u64,
    estimated_total_aminos: Option<u64>,
}

impl ChromosomeReader {
    /// Open a chromosome file
    ///
    /// # Arguments
    /// * `path` - FASTA file; its first line is skipped
    /// * `chunk_size` - Characters pulled from the file per refill
    pub fn open(path: impl AsRef<Path>, chunk_size: usize) -> Result<Self, ReaderError> {
        let (source, estimate) = open_file(path.as_ref())?;
        Self::with_source(
            source,
            Origin::File(path.as_ref().to_path_buf()),
            estimate,
            chunk_size,
        )
    }

    /// Read from any buffered source; such sources cannot be re-read by [`Self::reload`]
    pub fn from_reader<R>(name: &str, reader: R, chunk_size: usize) -> Result<Self, ReaderError>
    where
        R: BufRead + Send + 'static,
    {
        Self::with_source(
            Box::new(reader),
            Origin::Stream(name.to_string()),
            None,
            chunk_size,
        )
    }

    /// Read from in-memory text (header line included)
    pub fn from_text(name: &str, text: &str, chunk_size: usize) -> Result<Self, ReaderError> {
        let text: Arc<[u8]> = Arc::from(text.as_bytes());
        Self::with_source(
            Box::new(Cursor::new(text.clone())),
            Origin::Text {
                name: name.to_string(),
                text: text.clone(),
            },
            Some(text.len() as u64 / 3),
            chunk_size,
        )
    }

    fn with_source(
        source: Box<dyn BufRead + Send>,
        origin: Origin,
        estimated_total_aminos: Option<u64>,
        chunk_size: usize,
    ) -> Result<Self, ReaderError> {
        let mut reader = Self {
            source,
            origin,
            chunk: Vec::with_capacity(chunk_size),
            chunk_idx: 0,
            chunk_size: chunk_size.max(1),
            buffer: CodonBuffer::new(),
            more_coming: true,
            bases_read: 0,
            amino_acids_read: 0,
            estimated_total_aminos,
        };
        reader.start()?;
        Ok(reader)
    }

    /// Skip the header and prime the first chunk
    fn start(&mut self) -> Result<(), ReaderError> {
        self.buffer.reset();
        self.chunk.clear();
        self.chunk_idx = 0;
        self.more_coming = true;
        self.bases_read = 0;
        self.amino_acids_read = 0;

        let mut header = Vec::new();
        let skipped = self.source.read_until(b'\n', &mut header);
        skipped.map_err(|source| self.read_error(source))?;
        debug!(
            source = %self.origin.name(),
            header = %String::from_utf8_lossy(&header).trim_end(),
            "skipped header"
        );

        self.load_next_chunk()
    }

    /// Point the reader at another chromosome file
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), ReaderError> {
        let path = path.as_ref();
        let (source, estimate) = open_file(path)?;
        self.source = source;
        self.origin = Origin::File(path.to_path_buf());
        self.estimated_total_aminos = estimate;
        info!(source = %path.display(), "loaded chromosome");
        self.start()
    }

    /// Point the reader at another buffered source
    pub fn load_reader<R>(&mut self, name: &str, reader: R) -> Result<(), ReaderError>
    where
        R: BufRead + Send + 'static,
    {
        self.source = Box::new(reader);
        self.origin = Origin::Stream(name.to_string());
        self.estimated_total_aminos = None;
        info!(source = name, "loaded chromosome");
        self.start()
    }

    /// Restart the current source from its beginning
    pub fn reload(&mut self) -> Result<(), ReaderError> {
        match self.origin.clone() {
            Origin::File(path) => self.load_file(path),
            Origin::Text { name, text } => {
                self.source = Box::new(Cursor::new(text));
                info!(source = %name, "reloaded chromosome");
                self.start()
            }
            Origin::Stream(name) => Err(ReaderError::NotSeekable(name)),
        }
    }

    /// Restart the current source and discard its first `bases` base symbols
    pub fn seek_bases(&mut self, bases: u64) -> Result<(), ReaderError> {
        self.reload()?;
        while self.bases_read < bases {
            if self.chunk_idx >= self.chunk.len() {
                self.load_next_chunk()?;
                if self.chunk.is_empty() {
                    self.more_coming = false;
                    break;
                }
            }
            let byte = self.chunk[self.chunk_idx];
            self.chunk_idx += 1;
            if Symbol::classify(byte) != Symbol::Ignored {
                self.bases_read += 1;
            }
        }
        info!(bases = self.bases_read, "jumped");
        Ok(())
    }

    fn load_next_chunk(&mut self) -> Result<(), ReaderError> {
        self.chunk.clear();
        self.chunk_idx = 0;
        let filled = (&mut self.source)
            .take(self.chunk_size as u64)
            .read_to_end(&mut self.chunk);
        filled.map_err(|source| self.read_error(source))?;
        Ok(())
    }

    fn read_error(&self, source: std::io::Error) -> ReaderError {
        ReaderError::Read {
            source_name: self.origin.name(),
            source,
        }
    }

    /// Whether another decode attempt is worthwhile
    pub fn has_next(&self) -> bool {
        self.more_coming
    }

    /// Decode the next amino acid
    pub fn next_amino(&mut self) -> Result<Decoded, ReaderError> {
        if !self.more_coming {
            return Ok(Decoded::Exhausted);
        }

        loop {
            if self.chunk_idx >= self.chunk.len() {
                self.load_next_chunk()?;
                if self.chunk.is_empty() {
                    self.buffer.reset();
                    self.more_coming = false;
                    debug!(
                        bases = self.bases_read,
                        aminos = self.amino_acids_read,
                        "chromosome exhausted"
                    );
                    return Ok(Decoded::Exhausted);
                }
            }

            let byte = self.chunk[self.chunk_idx];
            self.chunk_idx += 1;

            match Symbol::classify(byte) {
                Symbol::Base(base) => {
                    self.bases_read += 1;
                    if let Some(codon) = self.buffer.push(base) {
                        self.amino_acids_read += 1;
                        return Ok(Decoded::Amino(AminoAcid::decode_codon(codon)));
                    }
                }
                Symbol::Wildcard => {
                    self.bases_read += 1;
                    self.buffer.reset();
                }
                Symbol::Ignored => {}
            }
        }
    }

    pub fn bases_read(&self) -> u64 {
        self.bases_read
    }

    pub fn amino_acids_read(&self) -> u64 {
        self.amino_acids_read
    }

    pub fn source_name(&self) -> String {
        self.origin.name()
    }

    pub fn estimated_total_aminos(&self) -> Option<u64> {
        self.estimated_total_aminos
    }

    pub fn status(&self) -> ReaderStatus {
        ReaderStatus {
            source_name: self.source_name(),
            bases_read: self.bases_read,
            amino_acids_read: self.amino_acids_read,
            estimated_total_aminos: self.estimated_total_aminos,
            has_next: self.more_coming,
        }
    }
}

impl Iterator for ChromosomeReader {
    type Item = Result<AminoAcid, ReaderError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_amino() {
            Ok(Decoded::Amino(aa)) => Some(Ok(aa)),
            Ok(Decoded::Exhausted) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

fn open_file(path: &Path) -> Result<(Box<dyn BufRead + Send>, Option<u64>), ReaderError> {
    let open_error = |source| ReaderError::Open {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(open_error)?;
    let estimate = file.metadata().map_err(open_error)?.len() / 3;
    Ok((Box::new(BufReader::new(file)), Some(estimate)))
}
