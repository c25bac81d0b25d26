use crate::core::models::structure::MolecularStructure;
use crate::core::topology::backbone::{compute_backbone_segments, compute_backbone_sequences};
use crate::core::topology::bonds::{CovalentBondCriteria, compute_covalent_bonds_with};
use crate::core::topology::chains::{compute_chains, compute_residue_bonds};
use tracing::{info, instrument};

/// Counts describing the derived topology of a structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopologySummary {
    pub bonds: usize,
    pub chains: usize,
    pub valid_segments: usize,
    pub sequences: usize,
}

/// Derives bonds, chains and the backbone of `structure` from its current
/// positions, replacing any previously derived topology.
///
/// Bonds are restricted to neighbouring residues when the structure has
/// residues. Missing chains or backbone are not errors; the corresponding tables
/// are simply empty.
#[instrument(skip_all, name = "topology_workflow")]
pub fn build_topology(
    structure: &mut MolecularStructure,
    criteria: &CovalentBondCriteria,
) -> TopologySummary {
    let residue_indices = (!structure.residues().is_empty()).then(|| structure.residue_indices());
    let bonds = compute_covalent_bonds_with(
        structure.positions(),
        structure.elements(),
        residue_indices,
        criteria,
    );

    let residue_bonds = compute_residue_bonds(&bonds, structure.residue_indices());
    let chains = compute_chains(structure.residues().len(), &residue_bonds);

    let segments = compute_backbone_segments(structure.residues(), structure.labels());
    let sequences = compute_backbone_sequences(&segments, &chains);

    let summary = TopologySummary {
        bonds: bonds.len(),
        chains: chains.len(),
        valid_segments: segments.iter().flatten().count(),
        sequences: sequences.len(),
    };
    info!(
        atoms = structure.atom_count(),
        residues = structure.residues().len(),
        bonds = summary.bonds,
        chains = summary.chains,
        backbone_segments = summary.valid_segments,
        sequences = summary.sequences,
        "Derived topology."
    );

    structure.set_bonds(bonds);
    structure.set_chains(chains);
    structure.set_backbone(segments, sequences);
    summary
}
