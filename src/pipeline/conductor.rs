//! Conductor
//!
//! Turns the amino-acid stream into sequences and drives playback. Amino
//! acids between a start and a stop marker form a polypeptide; a completed
//! polypeptide is classified by length and queued on the matching group.
//! Each call to [`Conductor::process_step`] commits queued changes on
//! downbeats, ages the slots and collects the step's notes.

use tracing::{info, trace};

use crate::config::ConductorConfig;
use crate::error::ConfigError;
use crate::genome::{AminoAcid, AMINO_ACID_COUNT};
use crate::pipeline::group::{SequenceGroup, SizeClass};
use crate::pipeline::polypeptide::Polypeptide;
use crate::pipeline::sequence::{NoteEvent, Sequence};

/// What happened to a completed polypeptide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Queued on the group of this class; carries the chain length
    Queued(SizeClass, usize),
    /// Too short for any class
    Dropped(usize),
}

/// Effect of feeding one amino acid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AminoOutcome {
    /// Outside a reading frame and not a start marker
    Ignored,
    /// Opened a new polypeptide
    Started,
    /// Appended to the open polypeptide
    Extended,
    /// Closed the open polypeptide
    Completed(Admission),
}

/// Effect of a density change request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DensityOutcome {
    Applied,
    EmptySlot,
    NoSuchChannel,
}

pub struct Conductor {
    config: ConductorConfig,
    groups: [SequenceGroup; 3],
    in_progress: Option<Polypeptide>,
    amino_acid_counts: [u64; AMINO_ACID_COUNT],
}

impl Conductor {
    /// Create a conductor with empty groups
    ///
    /// The configuration is expected to be valid; see [`ConductorConfig::validate`].
    pub fn new(config: ConductorConfig) -> Self {
        let groups = build_groups(&config);
        Self {
            config,
            groups,
            in_progress: None,
            amino_acid_counts: [0; AMINO_ACID_COUNT],
        }
    }

    /// Validate the configuration, then create the conductor
    pub fn try_new(config: ConductorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &ConductorConfig {
        &self.config
    }

    /// Groups in playback order (small, medium, large)
    pub fn groups(&self) -> &[SequenceGroup] {
        &self.groups
    }

    pub fn group(&self, class: SizeClass) -> &SequenceGroup {
        &self.groups[class as usize]
    }

    pub fn group_mut(&mut self, class: SizeClass) -> &mut SequenceGroup {
        &mut self.groups[class as usize]
    }

    pub fn total_channels(&self) -> usize {
        self.groups.iter().map(SequenceGroup::capacity).sum()
    }

    pub fn is_synthesizing(&self) -> bool {
        self.in_progress.is_some()
    }

    /// Length of the open polypeptide, if any
    pub fn in_progress_len(&self) -> Option<usize> {
        self.in_progress.as_ref().map(Polypeptide::len)
    }

    /// Occurrences of each coding amino acid seen so far, stop markers excluded
    pub fn amino_acid_counts(&self) -> &[u64; AMINO_ACID_COUNT] {
        &self.amino_acid_counts
    }

    /// Feed one decoded amino acid
    pub fn add_amino(&mut self, aa: AminoAcid) -> AminoOutcome {
        if let Some(index) = aa.index() {
            self.amino_acid_counts[index] += 1;
        }

        match self.in_progress.take() {
            Some(polypeptide) if aa.is_stop_marker() => {
                AminoOutcome::Completed(self.admit(polypeptide))
            }
            Some(mut polypeptide) => {
                polypeptide.push(aa);
                self.in_progress = Some(polypeptide);
                AminoOutcome::Extended
            }
            None if aa.is_start_marker() => {
                self.in_progress = Some(Polypeptide::new());
                AminoOutcome::Started
            }
            None => AminoOutcome::Ignored,
        }
    }

    /// Longest class whose threshold the length strictly exceeds
    pub fn classify(&self, len: usize) -> Option<SizeClass> {
        [SizeClass::Large, SizeClass::Medium, SizeClass::Small]
            .into_iter()
            .find(|&class| len > self.config.group(class).length_threshold)
    }

    fn admit(&mut self, polypeptide: Polypeptide) -> Admission {
        let len = polypeptide.len();
        let Some(class) = self.classify(len) else {
            trace!(len, "dropped short polypeptide");
            return Admission::Dropped(len);
        };

        let group_config = *self.config.group(class);
        let sequence = Sequence::new(polypeptide, group_config.size, group_config.sequence);
        self.group_mut(class).append_pending_sequence(sequence);
        info!(class = %class, len, "new sequence");
        Admission::Queued(class, len)
    }

    /// Advance every group to `step` and collect the notes it produces
    ///
    /// Groups are flushed on their own downbeats and aged every step before
    /// any events are gathered. Events come out small group first, then
    /// medium, then large, each in slot order.
    pub fn process_step(&mut self, step: u64) -> Vec<NoteEvent> {
        for group in self.groups.iter_mut() {
            if group.is_downbeat(step) {
                group.flush_pending_sequences();
            }
            group.age_sequences();
        }

        let events: Vec<NoteEvent> = self
            .groups
            .iter()
            .flat_map(|group| group.events_for_step(step))
            .collect();
        trace!(step, events = events.len(), "processed step");
        events
    }

    /// Forward a density change to the sequence playing on `channel`
    pub fn set_density(&mut self, channel: u32, density: f32) -> DensityOutcome {
        let Some(group) = self
            .groups
            .iter_mut()
            .find(|g| g.channel_range().contains(&channel))
        else {
            return DensityOutcome::NoSuchChannel;
        };

        let idx = (channel - group.channel_offset()) as usize;
        match group.slot_mut(idx).and_then(|slot| slot.sequence_mut()) {
            Some(seq) => {
                seq.set_density(density);
                DensityOutcome::Applied
            }
            None => DensityOutcome::EmptySlot,
        }
    }

    /// Drop the open polypeptide, the histogram and every queued or playing sequence
    pub fn reset(&mut self) {
        self.in_progress = None;
        self.amino_acid_counts = [0; AMINO_ACID_COUNT];
        self.groups = build_groups(&self.config);
        info!("conductor reset");
    }
}

impl Default for Conductor {
    fn default() -> Self {
        Self::new(ConductorConfig::default())
    }
}

/// Lay the groups out on consecutive channel ranges
fn build_groups(config: &ConductorConfig) -> [SequenceGroup; 3] {
    let mut offset = config.first_channel;
    SizeClass::ALL.map(|class| {
        let group_config = config.group(class);
        let group = SequenceGroup::new(
            class,
            group_config.capacity,
            group_config.size,
            offset,
            group_config.group,
        );
        offset += group_config.capacity as u32;
        group
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GroupConfig, GroupOptions, SequenceOptions};

    /// Thresholds 2 / 4 / 6, two small slots, one medium, one large
    fn small_config() -> ConductorConfig {
        let group = |capacity, size, length_threshold| GroupConfig {
            capacity,
            size,
            length_threshold,
            sequence: SequenceOptions::default(),
            group: GroupOptions::default(),
        };
        ConductorConfig {
            small: group(2, 4, 2),
            medium: group(1, 8, 4),
            large: group(1, 16, 6),
            first_channel: 1,
            chunk_size: 16,
        }
    }

    fn feed_chain(conductor: &mut Conductor, len: usize) -> AminoOutcome {
        assert_eq!(conductor.add_amino(AminoAcid::Met), AminoOutcome::Started);
        for _ in 0..len {
            assert_eq!(conductor.add_amino(AminoAcid::Ala), AminoOutcome::Extended);
        }
        conductor.add_amino(AminoAcid::Stop)
    }

    #[test]
    fn test_default_channel_layout() {
        let conductor = Conductor::default();
        let ranges: Vec<_> = conductor
            .groups()
            .iter()
            .map(SequenceGroup::channel_range)
            .collect();
        assert_eq!(ranges, vec![1..5, 5..7, 7..8]);
        assert_eq!(conductor.total_channels(), 7);
    }

    #[test]
    fn test_try_new_validates() {
        let mut config = small_config();
        config.small.size = 0;
        assert!(matches!(
            Conductor::try_new(config),
            Err(ConfigError::ZeroSize { group: "small" })
        ));
    }

    #[test]
    fn test_amino_outside_frame_is_ignored() {
        let mut conductor = Conductor::new(small_config());
        assert_eq!(conductor.add_amino(AminoAcid::Ala), AminoOutcome::Ignored);
        assert_eq!(conductor.add_amino(AminoAcid::Stop), AminoOutcome::Ignored);
        assert!(!conductor.is_synthesizing());
    }

    #[test]
    fn test_markers_excluded_from_length() {
        let mut conductor = Conductor::new(small_config());
        conductor.add_amino(AminoAcid::Met);
        conductor.add_amino(AminoAcid::Gly);
        // a second start marker inside the frame is ordinary content
        conductor.add_amino(AminoAcid::Met);
        assert_eq!(conductor.in_progress_len(), Some(2));
        assert_eq!(
            conductor.add_amino(AminoAcid::Stop),
            AminoOutcome::Completed(Admission::Dropped(2))
        );
        assert!(!conductor.is_synthesizing());
    }

    #[test]
    fn test_histogram_counts_everything_but_stops() {
        let mut conductor = Conductor::new(small_config());
        conductor.add_amino(AminoAcid::Ala);
        conductor.add_amino(AminoAcid::Met);
        conductor.add_amino(AminoAcid::Ala);
        conductor.add_amino(AminoAcid::Stop);
        conductor.add_amino(AminoAcid::Stop);

        let counts = conductor.amino_acid_counts();
        assert_eq!(counts[AminoAcid::Ala.index().unwrap()], 2);
        assert_eq!(counts[AminoAcid::Met.index().unwrap()], 1);
        assert_eq!(counts.iter().sum::<u64>(), 3);
    }

    #[test]
    fn test_thresholds_are_strict() {
        let conductor = Conductor::new(small_config());
        assert_eq!(conductor.classify(2), None);
        assert_eq!(conductor.classify(3), Some(SizeClass::Small));
        assert_eq!(conductor.classify(4), Some(SizeClass::Small));
        assert_eq!(conductor.classify(5), Some(SizeClass::Medium));
        assert_eq!(conductor.classify(6), Some(SizeClass::Medium));
        assert_eq!(conductor.classify(7), Some(SizeClass::Large));
        assert_eq!(conductor.classify(700), Some(SizeClass::Large));
    }

    #[test]
    fn test_completed_chain_is_queued() {
        let mut conductor = Conductor::new(small_config());
        assert_eq!(
            feed_chain(&mut conductor, 5),
            AminoOutcome::Completed(Admission::Queued(SizeClass::Medium, 5))
        );
        assert_eq!(conductor.group(SizeClass::Medium).pending_count(), 1);
        assert_eq!(conductor.group(SizeClass::Medium).occupied_count(), 0);
    }

    #[test]
    fn test_commit_waits_for_group_downbeat() {
        let mut conductor = Conductor::new(small_config());
        conductor.process_step(0);
        feed_chain(&mut conductor, 3);

        // small group cycles every 4 steps
        for step in 1..4 {
            assert!(conductor.process_step(step).is_empty());
        }
        let events = conductor.process_step(4);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].channel, 1);
    }

    #[test]
    fn test_events_ordered_by_group_then_slot() {
        let mut conductor = Conductor::new(small_config());
        // queue large first, then two small
        feed_chain(&mut conductor, 7);
        feed_chain(&mut conductor, 3);
        feed_chain(&mut conductor, 3);
        feed_chain(&mut conductor, 5);

        let channels: Vec<u32> = conductor
            .process_step(0)
            .iter()
            .map(|e| e.channel)
            .collect();
        assert_eq!(channels, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_set_density_routing() {
        let mut conductor = Conductor::new(small_config());
        feed_chain(&mut conductor, 3);
        conductor.process_step(0);

        assert_eq!(conductor.set_density(1, 0.0), DensityOutcome::Applied);
        assert!(conductor.process_step(4).is_empty());
        assert_eq!(conductor.set_density(2, 0.5), DensityOutcome::EmptySlot);
        assert_eq!(conductor.set_density(0, 0.5), DensityOutcome::NoSuchChannel);
        assert_eq!(conductor.set_density(5, 0.5), DensityOutcome::NoSuchChannel);
    }

    #[test]
    fn test_max_age_evicts_on_next_downbeat() {
        let mut config = small_config();
        config.small.group.max_age = Some(3);
        let mut conductor = Conductor::new(config);
        feed_chain(&mut conductor, 3);

        conductor.process_step(0);
        let small = |c: &Conductor| c.group(SizeClass::Small).occupied_count();
        for step in 1..4 {
            // still audible while marked
            assert!(!conductor.process_step(step).is_empty());
            assert_eq!(small(&conductor), 1);
        }
        assert!(conductor.group(SizeClass::Small).is_marked_for_eviction(0));

        conductor.process_step(4);
        assert_eq!(small(&conductor), 0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut config = small_config();
        config.small.group.fixed_density = 0.5;
        let mut conductor = Conductor::new(config);
        feed_chain(&mut conductor, 3);
        conductor.process_step(0);
        conductor.add_amino(AminoAcid::Met);

        conductor.reset();
        assert!(!conductor.is_synthesizing());
        assert_eq!(conductor.amino_acid_counts().iter().sum::<u64>(), 0);
        assert_eq!(conductor.group(SizeClass::Small).occupied_count(), 0);
        assert_eq!(conductor.group(SizeClass::Small).next_slot(), 0);
        assert_eq!(conductor.group(SizeClass::Small).options().fixed_density, 0.5);
    }
}
