use std::ops::Range;

/// A residue: a contiguous range of atoms sharing a name and sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Residue {
    pub name: String,             // Residue name as read from the source (e.g., "ALA")
    pub id: isize,                // Sequence number from the source file
    pub atom_range: Range<usize>, // [beg, end) into the parallel atom arrays
    pub chain: Option<usize>,     // Owning chain index; None until chains are derived
}

impl Residue {
    pub fn new(name: &str, id: isize, atom_range: Range<usize>) -> Self {
        Self {
            name: name.to_string(),
            id,
            atom_range,
            chain: None,
        }
    }

    pub fn atom_count(&self) -> usize {
        self.atom_range.len()
    }
}
