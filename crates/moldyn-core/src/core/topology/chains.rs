use crate::core::models::chain::Chain;
use crate::core::models::topology::Bond;
use itertools::Itertools;

/// Maps atom-level bonds to residue-level bonds, discarding intra-residue bonds
/// and bonds to atoms outside every residue.
///
/// The result uses [`Bond`] with residue indices as endpoints. Because residues
/// cover ascending atom ranges, bonds sorted by first atom map to residue bonds
/// sorted by first residue.
pub fn compute_residue_bonds(bonds: &[Bond], residue_indices: &[Option<usize>]) -> Vec<Bond> {
    bonds
        .iter()
        .filter_map(|bond| {
            let ra = residue_indices[bond.atom_a]?;
            let rb = residue_indices[bond.atom_b]?;
            (ra != rb).then(|| Bond::new(ra, rb))
        })
        .dedup()
        .collect()
}

/// Groups residues into chains using a single left-to-right sweep over the
/// residue bonds.
///
/// Each residue without a chain opens a new one; every residue bonded to it with
/// a larger index adopts its chain. Chains are then the maximal runs of residues
/// sharing a chain id, labelled `"C{id}"`. Without residue bonds there are no
/// chains at all.
///
/// # Panics
///
/// Panics if `residue_bonds` is not sorted by its first residue index.
pub fn compute_chains(residue_count: usize, residue_bonds: &[Bond]) -> Vec<Chain> {
    if residue_bonds.is_empty() {
        return Vec::new();
    }
    assert!(
        residue_bonds.is_sorted_by_key(|b| b.atom_a),
        "residue bonds must be sorted by first residue index"
    );

    let mut chain_ids: Vec<Option<usize>> = vec![None; residue_count];
    let mut next_chain = 0;
    let mut cursor = 0;
    for i in 0..residue_count {
        if chain_ids[i].is_none() {
            chain_ids[i] = Some(next_chain);
            next_chain += 1;
        }
        while let Some(bond) = residue_bonds.get(cursor) {
            if bond.atom_a > i {
                break;
            }
            if bond.atom_a == i {
                chain_ids[bond.atom_b] = chain_ids[i];
            }
            cursor += 1;
        }
    }

    chain_ids
        .iter()
        .enumerate()
        .chunk_by(|(_, id)| **id)
        .into_iter()
        .map(|(id, mut run)| {
            let beg = run.next().map_or(0, |(i, _)| i);
            let end = run.last().map_or(beg, |(i, _)| i) + 1;
            Chain::new(format!("C{}", id.unwrap_or_default()), beg..end)
        })
        .collect()
}
