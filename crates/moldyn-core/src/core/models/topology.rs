use std::fmt;

/// A covalent bond between two atoms, stored with `atom_a < atom_b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bond {
    pub atom_a: usize,
    pub atom_b: usize,
}

impl Bond {
    /// Creates a bond with its endpoints in ascending order.
    pub fn new(a: usize, b: usize) -> Self {
        assert_ne!(a, b, "an atom cannot bond to itself");
        Self {
            atom_a: a.min(b),
            atom_b: a.max(b),
        }
    }

    pub fn contains(&self, atom: usize) -> bool {
        self.atom_a == atom || self.atom_b == atom
    }
}

impl fmt::Display for Bond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.atom_a, self.atom_b)
    }
}

/// Backbone atom indices of one amino-acid residue.
///
/// Residues that are not recognized amino acids, or that lack one of the four
/// atoms, have no segment; the per-residue table stores `None` for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BackboneSegment {
    pub n_idx: usize,
    pub ca_idx: usize,
    pub c_idx: usize,
    pub o_idx: usize,
}

/// Dihedral angles of one residue at one frame, in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BackboneAngles {
    pub omega: f32,
    pub phi: f32,
    pub psi: f32,
}

/// A run of consecutive residues with valid backbone segments inside one chain.
///
/// Angles and splines are computed per sequence, so an invalid residue splits
/// its chain rather than producing meaningless torsions across the gap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackboneSequence {
    pub chain: usize,
    pub residue_range: std::ops::Range<usize>,
}
