//! Genome-driven step sequencer
//!
//! Reads a chromosome as a stream of codons, assembles the decoded amino
//! acids into polypeptides and turns every completed polypeptide into a
//! looping musical sequence that plays from a fixed pool of channels.
//!
//! - [`genome`]: nucleotide alphabet, amino-acid table and the streaming reader
//! - [`pipeline`]: polypeptides, sequences, slot groups and the conductor
//! - [`control`]: command parser and the session that serializes commands

pub mod config;
pub mod control;
pub mod error;
pub mod genome;
pub mod logging;
pub mod pipeline;

pub use config::{ConductorConfig, GroupConfig, GroupOptions, SequenceOptions};
pub use error::{ConfigError, Error, ParseError, ReaderError, Result};
pub use genome::{AminoAcid, ChromosomeReader, Decoded, Nucleotide};
pub use pipeline::{Conductor, NoteEvent, Sequence, SequenceGroup, SizeClass};
