//! Fixed-capacity slot pool for one size class
//!
//! New sequences and evictions are staged and only become visible to
//! playback when [`SequenceGroup::flush_pending_sequences`] runs on a
//! downbeat. Slots are filled round-robin; an occupied slot is simply
//! overwritten.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;

use tracing::debug;

use crate::config::GroupOptions;
use crate::pipeline::sequence::{NoteEvent, Sequence};

/// Size class of a sequence group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

impl SizeClass {
    /// Playback order
    pub const ALL: [SizeClass; 3] = [SizeClass::Small, SizeClass::Medium, SizeClass::Large];

    pub fn name(self) -> &'static str {
        match self {
            SizeClass::Small => "small",
            SizeClass::Medium => "medium",
            SizeClass::Large => "large",
        }
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// One position in the ring
#[derive(Debug, Clone, Default)]
pub enum Slot {
    #[default]
    Empty,
    Occupied(Sequence),
}

impl Slot {
    pub fn sequence(&self) -> Option<&Sequence> {
        match self {
            Slot::Empty => None,
            Slot::Occupied(seq) => Some(seq),
        }
    }

    pub fn sequence_mut(&mut self) -> Option<&mut Sequence> {
        match self {
            Slot::Empty => None,
            Slot::Occupied(seq) => Some(seq),
        }
    }

    pub fn is_occupied(&self) -> bool {
        matches!(self, Slot::Occupied(_))
    }
}

pub struct SequenceGroup {
    class: SizeClass,
    slots: Vec<Slot>,
    pending: Vec<Sequence>,
    to_evict: BTreeSet<usize>,
    next_slot: usize,
    size: u32,
    channel_offset: u32,
    options: GroupOptions,
}

impl SequenceGroup {
    /// Create an empty group
    ///
    /// # Arguments
    /// * `class` - Size class, used for logging
    /// * `capacity` - Number of slots
    /// * `size` - Steps per cycle; downbeats fall on multiples of this
    /// * `channel_offset` - Output channel of slot 0
    /// * `options` - Admission density and maximum age
    pub fn new(
        class: SizeClass,
        capacity: usize,
        size: u32,
        channel_offset: u32,
        options: GroupOptions,
    ) -> Self {
        assert!(capacity > 0, "sequence group needs at least one slot");
        assert!(size > 0, "sequence group needs a positive cycle length");
        Self {
            class,
            slots: vec![Slot::Empty; capacity],
            pending: Vec::new(),
            to_evict: BTreeSet::new(),
            next_slot: 0,
            size,
            channel_offset,
            options,
        }
    }

    pub fn class(&self) -> SizeClass {
        self.class
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn channel_offset(&self) -> u32 {
        self.channel_offset
    }

    /// Channels owned by this group
    pub fn channel_range(&self) -> Range<u32> {
        self.channel_offset..self.channel_offset + self.slots.len() as u32
    }

    pub fn options(&self) -> &GroupOptions {
        &self.options
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot_mut(&mut self, idx: usize) -> Option<&mut Slot> {
        self.slots.get_mut(idx)
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_occupied()).count()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Slot that the next committed sequence will overwrite
    pub fn next_slot(&self) -> usize {
        self.next_slot
    }

    pub fn is_marked_for_eviction(&self, idx: usize) -> bool {
        self.to_evict.contains(&idx)
    }

    pub fn is_downbeat(&self, step: u64) -> bool {
        step % u64::from(self.size) == 0
    }

    /// Queue a sequence for the next downbeat
    pub fn append_pending_sequence(&mut self, seq: Sequence) {
        self.pending.push(seq);
    }

    /// Apply staged evictions, then commit pending sequences in arrival order
    pub fn flush_pending_sequences(&mut self) {
        for idx in std::mem::take(&mut self.to_evict) {
            debug!(group = %self.class, slot = idx, "evicted sequence");
            self.slots[idx] = Slot::Empty;
        }

        let capacity = self.slots.len();
        for mut seq in self.pending.drain(..) {
            seq.set_density(self.options.fixed_density);
            debug!(
                group = %self.class,
                slot = self.next_slot,
                len = seq.len(),
                "committed sequence"
            );
            self.slots[self.next_slot] = Slot::Occupied(seq);
            self.next_slot = (self.next_slot + 1) % capacity;
        }
    }

    /// Mark a slot for clearing at the next flush
    ///
    /// Returns `false` if the slot was already marked.
    pub fn remove_sequence_at_index(&mut self, idx: usize) -> bool {
        assert!(
            idx < self.slots.len(),
            "slot index {} out of range for {} group",
            idx,
            self.class
        );
        let newly_marked = self.to_evict.insert(idx);
        if newly_marked {
            debug!(group = %self.class, slot = idx, "marked sequence for removal");
        }
        newly_marked
    }

    /// Age every occupied slot by one step and mark those past `max_age`
    pub fn age_sequences(&mut self) {
        let mut expired = Vec::new();
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            if let Slot::Occupied(seq) = slot {
                seq.age += 1;
                if let Some(max_age) = self.options.max_age {
                    if seq.age > u64::from(max_age) {
                        expired.push(idx);
                    }
                }
            }
        }
        for idx in expired {
            self.remove_sequence_at_index(idx);
        }
    }

    /// Events of every occupied slot, in slot order
    pub fn events_for_step(&self, step: u64) -> Vec<NoteEvent> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.sequence().map(|seq| (idx, seq)))
            .flat_map(|(idx, seq)| seq.events_for_step(step, self.channel_offset + idx as u32))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SequenceOptions;
    use crate::genome::AminoAcid;
    use crate::pipeline::polypeptide::Polypeptide;

    fn seq(aa: AminoAcid, len: usize) -> Sequence {
        let chain: Polypeptide = std::iter::repeat(aa).take(len).collect();
        Sequence::new(chain, 4, SequenceOptions::default())
    }

    fn group(capacity: usize, size: u32, options: GroupOptions) -> SequenceGroup {
        SequenceGroup::new(SizeClass::Small, capacity, size, 1, options)
    }

    fn lengths(g: &SequenceGroup) -> Vec<Option<usize>> {
        g.slots()
            .iter()
            .map(|s| s.sequence().map(Sequence::len))
            .collect()
    }

    #[test]
    fn test_downbeat() {
        let g = group(2, 16, GroupOptions::default());
        assert!(g.is_downbeat(0));
        assert!(!g.is_downbeat(15));
        assert!(g.is_downbeat(32));
    }

    #[test]
    fn test_pending_invisible_until_flush() {
        let mut g = group(2, 4, GroupOptions::default());
        g.append_pending_sequence(seq(AminoAcid::Ala, 1));
        assert_eq!(g.occupied_count(), 0);
        assert!(g.events_for_step(0).is_empty());

        g.flush_pending_sequences();
        assert_eq!(g.occupied_count(), 1);
        assert_eq!(g.pending_count(), 0);
        assert_eq!(g.events_for_step(0)[0].channel, 1);
    }

    #[test]
    fn test_round_robin_overwrites_oldest() {
        let mut g = group(2, 4, GroupOptions::default());
        for len in 1..=3 {
            g.append_pending_sequence(seq(AminoAcid::Ala, len));
        }
        g.flush_pending_sequences();
        assert_eq!(lengths(&g), vec![Some(3), Some(2)]);
        assert_eq!(g.next_slot(), 1);
    }

    #[test]
    fn test_eviction_applies_before_insertion() {
        let mut g = group(3, 4, GroupOptions::default());
        g.append_pending_sequence(seq(AminoAcid::Ala, 1));
        g.append_pending_sequence(seq(AminoAcid::Ala, 2));
        g.flush_pending_sequences();

        g.remove_sequence_at_index(0);
        g.append_pending_sequence(seq(AminoAcid::Ala, 3));
        assert_eq!(lengths(&g), vec![Some(1), Some(2), None]);

        g.flush_pending_sequences();
        assert_eq!(lengths(&g), vec![None, Some(2), Some(3)]);
        assert!(!g.is_marked_for_eviction(0));

        // the next insertion wraps onto the evicted slot
        g.append_pending_sequence(seq(AminoAcid::Ala, 4));
        g.flush_pending_sequences();
        assert_eq!(lengths(&g), vec![Some(4), Some(2), Some(3)]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut g = group(2, 4, GroupOptions::default());
        assert!(g.remove_sequence_at_index(1));
        assert!(!g.remove_sequence_at_index(1));
        assert!(g.is_marked_for_eviction(1));
    }

    #[test]
    #[should_panic]
    fn test_remove_out_of_range_panics() {
        let mut g = group(2, 4, GroupOptions::default());
        g.remove_sequence_at_index(2);
    }

    #[test]
    fn test_flush_applies_fixed_density() {
        let options = GroupOptions {
            fixed_density: 0.25,
            max_age: None,
        };
        let mut g = group(1, 4, options);
        g.append_pending_sequence(seq(AminoAcid::Tyr, 2));
        g.flush_pending_sequences();
        let density = g.slots()[0].sequence().map(Sequence::density);
        assert_eq!(density, Some(0.25));
    }

    #[test]
    fn test_aging_marks_over_age_slots() {
        let options = GroupOptions {
            fixed_density: 1.0,
            max_age: Some(2),
        };
        let mut g = group(2, 4, options);
        g.append_pending_sequence(seq(AminoAcid::Ala, 1));
        g.flush_pending_sequences();

        g.age_sequences();
        g.age_sequences();
        assert!(!g.is_marked_for_eviction(0));
        g.age_sequences();
        assert!(g.is_marked_for_eviction(0));
        assert_eq!(g.slots()[0].sequence().map(|s| s.age), Some(3));
        assert!(!g.is_marked_for_eviction(1));

        g.flush_pending_sequences();
        assert_eq!(g.occupied_count(), 0);
    }

    #[test]
    fn test_unbounded_age_never_marks() {
        let mut g = group(1, 4, GroupOptions::default());
        g.append_pending_sequence(seq(AminoAcid::Ala, 1));
        g.flush_pending_sequences();
        for _ in 0..1000 {
            g.age_sequences();
        }
        assert!(!g.is_marked_for_eviction(0));
    }
}
