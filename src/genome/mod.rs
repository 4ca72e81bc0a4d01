//! Genome decoding
//!
//! - Nucleotide: base alphabet and codon buffer
//! - Amino: amino-acid table and genetic code
//! - Reader: streaming codon decoder over a chromosome source

pub mod amino;
pub mod nucleotide;
pub mod reader;

pub use amino::{AminoAcid, ALPHABET, AMINO_ACID_COUNT};
pub use nucleotide::{CodonBuffer, Nucleotide, Symbol};
pub use reader::{ChromosomeReader, Decoded, ReaderStatus};
