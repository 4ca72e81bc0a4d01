use crate::genome::AminoAcid;

/// Amino acids collected between a start and a stop marker
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Polypeptide {
    amino_acids: Vec<AminoAcid>,
}

impl Polypeptide {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, aa: AminoAcid) {
        self.amino_acids.push(aa);
    }

    pub fn len(&self) -> usize {
        self.amino_acids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amino_acids.is_empty()
    }

    pub fn into_amino_acids(self) -> Vec<AminoAcid> {
        self.amino_acids
    }
}

impl FromIterator<AminoAcid> for Polypeptide {
    fn from_iter<I: IntoIterator<Item = AminoAcid>>(iter: I) -> Self {
        Self {
            amino_acids: iter.into_iter().collect(),
        }
    }
}
