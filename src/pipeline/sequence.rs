//! Musical sequence rendered from a polypeptide
//!
//! A sequence loops over `size` cells. Each cell holds one amino acid sampled
//! evenly from the polypeptide, so long and short chains fill the same cycle.
//! The cell under the playhead fires a note when its density gate passes.

use crate::config::SequenceOptions;
use crate::genome::{AminoAcid, AMINO_ACID_COUNT};
use crate::pipeline::polypeptide::Polypeptide;

/// Lowest pitch a sequence can emit (MIDI note number)
const BASE_NOTE: u8 = 48;
/// Major pentatonic degrees
const SCALE: [u8; 5] = [0, 2, 4, 7, 9];

/// One note for one output channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteEvent {
    pub channel: u32,
    pub pitch: u8,
    pub velocity: u8,
    /// Length in global steps
    pub duration: u32,
}

impl NoteEvent {
    /// Flat form for the outgoing message layer
    pub fn to_tuple(&self) -> (u32, u8, u8, u32) {
        (self.channel, self.pitch, self.velocity, self.duration)
    }
}

#[derive(Debug, Clone)]
pub struct Sequence {
    amino_acids: Vec<AminoAcid>,
    cells: Vec<AminoAcid>,
    size: u32,
    step_rate: u32,
    density: f32,
    /// Steps since the sequence was committed to a slot
    pub age: u64,
}

impl Sequence {
    /// Create a new sequence
    ///
    /// # Arguments
    /// * `polypeptide` - Completed chain; ownership moves into the sequence
    /// * `size` - Cells per cycle
    /// * `options` - Playback options of the size class
    pub fn new(polypeptide: Polypeptide, size: u32, options: SequenceOptions) -> Self {
        let mut sequence = Self {
            amino_acids: polypeptide.into_amino_acids(),
            cells: Vec::new(),
            size: size.max(1),
            step_rate: options.step_rate.max(1),
            density: 1.0,
            age: 0,
        };
        sequence.resample();
        sequence
    }

    fn resample(&mut self) {
        let len = self.amino_acids.len();
        self.cells = if len == 0 {
            Vec::new()
        } else {
            (0..self.size as usize)
                .map(|i| self.amino_acids[i * len / self.size as usize])
                .collect()
        };
    }

    /// Length of the underlying polypeptide
    pub fn len(&self) -> usize {
        self.amino_acids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amino_acids.is_empty()
    }

    /// Cells per cycle
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn step_rate(&self) -> u32 {
        self.step_rate
    }

    pub fn append(&mut self, aa: AminoAcid) {
        self.amino_acids.push(aa);
        self.resample();
    }

    pub fn density(&self) -> f32 {
        self.density
    }

    /// Clamped to `0.0..=1.0`; NaN silences the sequence
    pub fn set_density(&mut self, density: f32) {
        self.density = if density.is_nan() {
            0.0
        } else {
            density.clamp(0.0, 1.0)
        };
    }

    /// Cell index under the playhead, if the sequence advances on this step
    fn cell_at(&self, step: u64) -> Option<usize> {
        let rate = u64::from(self.step_rate);
        if self.cells.is_empty() || step % rate != 0 {
            return None;
        }
        Some(((step / rate) % u64::from(self.size)) as usize)
    }

    /// Notes produced on `step` for output `channel`
    pub fn events_for_step(&self, step: u64, channel: u32) -> Vec<NoteEvent> {
        let Some(cell) = self.cell_at(step) else {
            return Vec::new();
        };
        let aa = self.cells[cell];
        let Some(index) = aa.index() else {
            return Vec::new();
        };

        let gate = index as f32 / AMINO_ACID_COUNT as f32;
        if gate >= self.density {
            return Vec::new();
        }

        vec![NoteEvent {
            channel,
            pitch: pitch_for(index),
            velocity: velocity_for(aa, index),
            duration: self.step_rate,
        }]
    }
}

fn pitch_for(index: usize) -> u8 {
    let octave = (index / SCALE.len()) as u8;
    BASE_NOTE + 12 * octave + SCALE[index % SCALE.len()]
}

fn velocity_for(aa: AminoAcid, index: usize) -> u8 {
    if aa.is_hydrophobic() {
        112
    } else {
        64 + 12 * (index % 4) as u8
    }
}
