use std::ops::Range;

/// A run of residues connected by inter-residue bonds.
///
/// Chains are derived from the bond list and carry a synthetic label
/// (`"C0"`, `"C1"`, ...); they are rebuilt whenever bonds or residues change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    pub label: String,
    pub residue_range: Range<usize>,
}

impl Chain {
    pub fn new(label: impl Into<String>, residue_range: Range<usize>) -> Self {
        Self {
            label: label.into(),
            residue_range,
        }
    }

    pub fn residue_count(&self) -> usize {
        self.residue_range.len()
    }
}
