//! Sequencing pipeline
//!
//! Provides the path from amino acids to timed notes:
//! - Polypeptide: amino acids between start and stop markers
//! - Sequence: looping note pattern derived from one polypeptide
//! - SequenceGroup: fixed slot pool with downbeat commits and aging
//! - Conductor: synthesis state machine and per-step orchestration

pub mod conductor;
pub mod group;
pub mod polypeptide;
pub mod sequence;

pub use conductor::{Admission, AminoOutcome, Conductor, DensityOutcome};
pub use group::{SequenceGroup, SizeClass, Slot};
pub use polypeptide::Polypeptide;
pub use sequence::{NoteEvent, Sequence};
