//! Nucleotide alphabet and the three-slot codon buffer

/// One of the four canonical bases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nucleotide {
    A,
    C,
    G,
    T,
}

/// Classification of a raw input character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Base(Nucleotide),
    /// Unreadable position (`N`); voids the codon being assembled
    Wildcard,
    /// Whitespace, line breaks and anything outside the alphabet
    Ignored,
}

impl Symbol {
    /// Classify a byte, ignoring case
    pub fn classify(byte: u8) -> Self {
        match byte.to_ascii_uppercase() {
            b'A' => Symbol::Base(Nucleotide::A),
            b'C' => Symbol::Base(Nucleotide::C),
            b'G' => Symbol::Base(Nucleotide::G),
            b'T' => Symbol::Base(Nucleotide::T),
            b'N' => Symbol::Wildcard,
            _ => Symbol::Ignored,
        }
    }
}

/// Fixed three-slot buffer that assembles one codon
#[derive(Debug, Clone, Default)]
pub struct CodonBuffer {
    slots: [Option<Nucleotide>; 3],
    idx: usize,
}

impl CodonBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of filled slots (0..=3)
    pub fn len(&self) -> usize {
        self.idx
    }

    pub fn is_empty(&self) -> bool {
        self.idx == 0
    }

    /// Discard any partially assembled codon
    pub fn reset(&mut self) {
        self.slots = [None; 3];
        self.idx = 0;
    }

    /// Append a base; returns the completed codon once three are buffered
    ///
    /// Completing a codon empties the buffer.
    pub fn push(&mut self, base: Nucleotide) -> Option<[Nucleotide; 3]> {
        assert!(self.idx < 3, "codon buffer overfilled");
        self.slots[self.idx] = Some(base);
        self.idx += 1;

        if self.idx < 3 {
            return None;
        }

        let codon = match self.slots {
            [Some(a), Some(b), Some(c)] => [a, b, c],
            _ => unreachable!("full codon buffer has an empty slot"),
        };
        self.reset();
        Some(codon)
    }
}
