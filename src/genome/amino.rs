//! Amino-acid alphabet and the standard genetic code

use std::fmt;

use super::nucleotide::Nucleotide;

/// Number of amino acids tracked by occurrence histograms (stop excluded)
pub const AMINO_ACID_COUNT: usize = 20;

/// Standard genetic code (NCBI table 1), indexed T/C/A/G per position
const STANDARD_CODE: &[u8; 64] =
    b"FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";

/// The twenty standard amino acids plus the stop signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AminoAcid {
    Ala,
    Cys,
    Asp,
    Glu,
    Phe,
    Gly,
    His,
    Ile,
    Lys,
    Leu,
    Met,
    Asn,
    Pro,
    Gln,
    Arg,
    Ser,
    Thr,
    Val,
    Trp,
    Tyr,
    Stop,
}

/// Coding amino acids in histogram order (alphabetical by one-letter code)
pub const ALPHABET: [AminoAcid; AMINO_ACID_COUNT] = [
    AminoAcid::Ala,
    AminoAcid::Cys,
    AminoAcid::Asp,
    AminoAcid::Glu,
    AminoAcid::Phe,
    AminoAcid::Gly,
    AminoAcid::His,
    AminoAcid::Ile,
    AminoAcid::Lys,
    AminoAcid::Leu,
    AminoAcid::Met,
    AminoAcid::Asn,
    AminoAcid::Pro,
    AminoAcid::Gln,
    AminoAcid::Arg,
    AminoAcid::Ser,
    AminoAcid::Thr,
    AminoAcid::Val,
    AminoAcid::Trp,
    AminoAcid::Tyr,
];

impl AminoAcid {
    /// Translate one codon. Total over the four-base alphabet.
    pub fn decode_codon(codon: [Nucleotide; 3]) -> Self {
        let position = |base: Nucleotide| match base {
            Nucleotide::T => 0,
            Nucleotide::C => 1,
            Nucleotide::A => 2,
            Nucleotide::G => 3,
        };
        let idx = 16 * position(codon[0]) + 4 * position(codon[1]) + position(codon[2]);
        match Self::from_one_letter(STANDARD_CODE[idx] as char) {
            Some(aa) => aa,
            None => unreachable!("genetic code table holds only valid letters"),
        }
    }

    pub fn from_one_letter(letter: char) -> Option<Self> {
        if letter == '*' {
            return Some(AminoAcid::Stop);
        }
        ALPHABET
            .iter()
            .copied()
            .find(|aa| aa.one_letter() == letter.to_ascii_uppercase())
    }

    /// Methionine opens a reading frame
    pub fn is_start_marker(self) -> bool {
        self == AminoAcid::Met
    }

    pub fn is_stop_marker(self) -> bool {
        self == AminoAcid::Stop
    }

    /// Position in [`ALPHABET`]; `None` for the stop signal
    pub fn index(self) -> Option<usize> {
        match self {
            AminoAcid::Stop => None,
            aa => Some(aa as usize),
        }
    }

    pub fn one_letter(self) -> char {
        match self {
            AminoAcid::Ala => 'A',
            AminoAcid::Cys => 'C',
            AminoAcid::Asp => 'D',
            AminoAcid::Glu => 'E',
            AminoAcid::Phe => 'F',
            AminoAcid::Gly => 'G',
            AminoAcid::His => 'H',
            AminoAcid::Ile => 'I',
            AminoAcid::Lys => 'K',
            AminoAcid::Leu => 'L',
            AminoAcid::Met => 'M',
            AminoAcid::Asn => 'N',
            AminoAcid::Pro => 'P',
            AminoAcid::Gln => 'Q',
            AminoAcid::Arg => 'R',
            AminoAcid::Ser => 'S',
            AminoAcid::Thr => 'T',
            AminoAcid::Val => 'V',
            AminoAcid::Trp => 'W',
            AminoAcid::Tyr => 'Y',
            AminoAcid::Stop => '*',
        }
    }

    pub fn three_letter(self) -> &'static str {
        match self {
            AminoAcid::Stop => "Ter",
            aa => {
                const NAMES: [&str; AMINO_ACID_COUNT] = [
                    "Ala", "Cys", "Asp", "Glu", "Phe", "Gly", "His", "Ile", "Lys", "Leu", "Met",
                    "Asn", "Pro", "Gln", "Arg", "Ser", "Thr", "Val", "Trp", "Tyr",
                ];
                NAMES[aa as usize]
            }
        }
    }

    /// Nonpolar side chain
    pub fn is_hydrophobic(self) -> bool {
        matches!(
            self,
            AminoAcid::Ala
                | AminoAcid::Val
                | AminoAcid::Ile
                | AminoAcid::Leu
                | AminoAcid::Met
                | AminoAcid::Phe
                | AminoAcid::Trp
                | AminoAcid::Pro
                | AminoAcid::Gly
        )
    }
}

impl fmt::Display for AminoAcid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.three_letter())
    }
}
