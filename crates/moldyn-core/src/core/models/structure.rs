use super::atom::Element;
use super::chain::Chain;
use super::residue::Residue;
use super::topology::{BackboneSegment, BackboneSequence, Bond};
use nalgebra::Point3;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StructureError {
    #[error("Per-atom array '{field}' has {found} entries, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Residue {index} ('{name}') covers atoms {beg}..{end}, which is out of order or out of bounds")]
    InvalidResidueRange {
        index: usize,
        name: String,
        beg: usize,
        end: usize,
    },
    #[error("Residue {id} ('{name}') contains no atoms")]
    EmptyResidue { id: isize, name: String },
}

/// A loaded molecular structure.
///
/// Atoms are stored as parallel arrays indexed by atom index. Residues partition
/// a prefix-free, ascending subset of the atom range; atoms outside every residue
/// (ions, solvent written without residue records) have no residue index. The
/// derived topology (bonds, chains, backbone) starts empty and is filled in by
/// [`crate::workflows::topology::build_topology`].
#[derive(Debug, Clone, Default)]
pub struct MolecularStructure {
    positions: Vec<Point3<f32>>,
    elements: Vec<Element>,
    labels: Vec<String>,
    residue_indices: Vec<Option<usize>>,
    residues: Vec<Residue>,

    // --- Derived topology ---
    bonds: Vec<Bond>,
    chains: Vec<Chain>,
    backbone: Vec<Option<BackboneSegment>>,
    backbone_sequences: Vec<BackboneSequence>,
}

impl MolecularStructure {
    /// Assembles a structure from parallel atom arrays and a residue table.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError`] if the arrays disagree in length or if residue
    /// ranges are empty, overlapping, descending or out of bounds.
    pub fn from_parts(
        positions: Vec<Point3<f32>>,
        elements: Vec<Element>,
        labels: Vec<String>,
        residues: Vec<Residue>,
    ) -> Result<Self, StructureError> {
        let n = positions.len();
        check_len("elements", n, elements.len())?;
        check_len("labels", n, labels.len())?;

        let mut residue_indices = vec![None; n];
        let mut cursor = 0;
        for (index, residue) in residues.iter().enumerate() {
            let range = &residue.atom_range;
            if range.is_empty() {
                return Err(StructureError::EmptyResidue {
                    id: residue.id,
                    name: residue.name.clone(),
                });
            }
            if range.start < cursor || range.end > n {
                return Err(StructureError::InvalidResidueRange {
                    index,
                    name: residue.name.clone(),
                    beg: range.start,
                    end: range.end,
                });
            }
            residue_indices[range.clone()].fill(Some(index));
            cursor = range.end;
        }

        Ok(Self {
            positions,
            elements,
            labels,
            residue_indices,
            residues,
            ..Default::default()
        })
    }

    pub fn atom_count(&self) -> usize {
        self.positions.len()
    }

    pub fn positions(&self) -> &[Point3<f32>] {
        &self.positions
    }

    /// Positions are the only per-atom data that changes after load.
    pub fn positions_mut(&mut self) -> &mut [Point3<f32>] {
        &mut self.positions
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn residue_indices(&self) -> &[Option<usize>] {
        &self.residue_indices
    }

    pub fn residues(&self) -> &[Residue] {
        &self.residues
    }

    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    /// One entry per residue, or empty if the structure has no usable backbone.
    pub fn backbone_segments(&self) -> &[Option<BackboneSegment>] {
        &self.backbone
    }

    pub fn backbone_sequences(&self) -> &[BackboneSequence] {
        &self.backbone_sequences
    }

    pub fn has_backbone(&self) -> bool {
        !self.backbone.is_empty()
    }

    /// Segments of one sequence; every entry is valid by construction.
    pub fn sequence_segments(&self, sequence: &BackboneSequence) -> Vec<BackboneSegment> {
        self.backbone[sequence.residue_range.clone()]
            .iter()
            .flatten()
            .copied()
            .collect()
    }

    pub(crate) fn set_bonds(&mut self, bonds: Vec<Bond>) {
        self.bonds = bonds;
    }

    /// Replaces the chain table and rewrites every residue's owning chain.
    pub(crate) fn set_chains(&mut self, chains: Vec<Chain>) {
        for residue in &mut self.residues {
            residue.chain = None;
        }
        for (chain_idx, chain) in chains.iter().enumerate() {
            for residue in &mut self.residues[chain.residue_range.clone()] {
                residue.chain = Some(chain_idx);
            }
        }
        self.chains = chains;
    }

    pub(crate) fn set_backbone(
        &mut self,
        backbone: Vec<Option<BackboneSegment>>,
        sequences: Vec<BackboneSequence>,
    ) {
        assert!(
            backbone.is_empty() || backbone.len() == self.residues.len(),
            "backbone table must be empty or index-aligned with residues"
        );
        self.backbone = backbone;
        self.backbone_sequences = sequences;
    }
}

fn check_len(field: &'static str, expected: usize, found: usize) -> Result<(), StructureError> {
    if expected == found {
        Ok(())
    } else {
        Err(StructureError::LengthMismatch {
            field,
            expected,
            found,
        })
    }
}

/// Incremental builder for [`MolecularStructure`].
///
/// Atoms added after [`StructureBuilder::start_residue`] belong to that residue
/// until the next call to `start_residue` or [`StructureBuilder::end_residue`].
#[derive(Debug, Default)]
pub struct StructureBuilder {
    positions: Vec<Point3<f32>>,
    elements: Vec<Element>,
    labels: Vec<String>,
    residues: Vec<Residue>,
    open_residue: Option<(isize, String, usize)>,
}

impl StructureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_residue(&mut self, id: isize, name: &str) -> &mut Self {
        self.end_residue();
        self.open_residue = Some((id, name.to_string(), self.positions.len()));
        self
    }

    pub fn end_residue(&mut self) -> &mut Self {
        if let Some((id, name, beg)) = self.open_residue.take() {
            self.residues
                .push(Residue::new(&name, id, beg..self.positions.len()));
        }
        self
    }

    pub fn add_atom(&mut self, label: &str, element: Element, position: Point3<f32>) -> &mut Self {
        self.positions.push(position);
        self.elements.push(element);
        self.labels.push(label.to_string());
        self
    }

    pub fn build(mut self) -> Result<MolecularStructure, StructureError> {
        self.end_residue();
        MolecularStructure::from_parts(self.positions, self.elements, self.labels, self.residues)
    }
}
