use crate::core::models::atom::Element;
use crate::core::models::topology::Bond;
use crate::core::spatial::SpatialHashGrid;
use nalgebra::Point3;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Distance window used to decide whether two atoms are covalently bonded.
///
/// With `d` the sum of both covalent radii, a pair is bonded when its distance
/// lies strictly between `d - lower_tolerance` and `d + upper_tolerance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CovalentBondCriteria {
    /// Neighbor search radius and spatial hash cell size.
    pub search_radius: f32,
    pub upper_tolerance: f32,
    pub lower_tolerance: f32,
}

impl Default for CovalentBondCriteria {
    fn default() -> Self {
        Self {
            search_radius: 3.5,
            upper_tolerance: 0.3,
            lower_tolerance: 0.5,
        }
    }
}

impl CovalentBondCriteria {
    pub fn is_bonded(
        &self,
        pos_a: &Point3<f32>,
        elem_a: Element,
        pos_b: &Point3<f32>,
        elem_b: Element,
    ) -> bool {
        let d = elem_a.covalent_radius() + elem_b.covalent_radius();
        let d_high = d + self.upper_tolerance;
        let d_low = d - self.lower_tolerance;
        let dist2 = (pos_a - pos_b).norm_squared();
        d_low * d_low < dist2 && dist2 < d_high * d_high
    }
}

/// Infers covalent bonds with the default [`CovalentBondCriteria`].
///
/// See [`compute_covalent_bonds_with`].
pub fn compute_covalent_bonds(
    positions: &[Point3<f32>],
    elements: &[Element],
    residue_indices: Option<&[Option<usize>]>,
) -> Vec<Bond> {
    compute_covalent_bonds_with(
        positions,
        elements,
        residue_indices,
        &CovalentBondCriteria::default(),
    )
}

/// Infers covalent bonds from positions and elements.
///
/// When residue indices are supplied only atoms whose residue indices differ by
/// less than two are paired, so bonds are either intra-residue or between
/// sequence neighbours. Atoms without a residue count as residue index -1.
///
/// Bonds come out with `atom_a < atom_b`, each pair once, ordered by `atom_a`.
pub fn compute_covalent_bonds_with(
    positions: &[Point3<f32>],
    elements: &[Element],
    residue_indices: Option<&[Option<usize>]>,
    criteria: &CovalentBondCriteria,
) -> Vec<Bond> {
    assert_eq!(positions.len(), elements.len(), "positions/elements length mismatch");
    if let Some(residues) = residue_indices {
        assert_eq!(positions.len(), residues.len(), "positions/residue length mismatch");
    }

    let grid = SpatialHashGrid::build(positions, criteria.search_radius);
    let residue_of = |i: usize| residue_indices.map(|r| r[i].map_or(-1, |idx| idx as isize));

    let bonds_of = |i: usize| -> Vec<Bond> {
        let pos_i = positions[i];
        let res_i = residue_of(i);
        grid.query(pos_i, criteria.search_radius)
            .filter(|&(j, _)| j > i)
            .filter(|&(j, _)| match (res_i, residue_of(j)) {
                (Some(a), Some(b)) => (a - b).abs() < 2,
                _ => true,
            })
            .filter(|(j, pos_j)| criteria.is_bonded(&pos_i, elements[i], pos_j, elements[*j]))
            .map(|(j, _)| Bond::new(i, j))
            .collect()
    };

    #[cfg(feature = "parallel")]
    let per_atom: Vec<Vec<Bond>> = (0..positions.len()).into_par_iter().map(bonds_of).collect();
    #[cfg(not(feature = "parallel"))]
    let per_atom: Vec<Vec<Bond>> = (0..positions.len()).map(bonds_of).collect();

    let bonds: Vec<Bond> = per_atom.into_iter().flatten().collect();
    debug!(atoms = positions.len(), bonds = bonds.len(), "Inferred covalent bonds");
    bonds
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn ideal_cc() -> f32 {
        2.0 * Element::Carbon.covalent_radius()
    }

    #[test]
    fn two_carbons_at_ideal_distance_form_one_bond() {
        let positions = [Point3::origin(), Point3::new(ideal_cc(), 0.0, 0.0)];
        let bonds = compute_covalent_bonds(&positions, &[Element::Carbon; 2], None);
        assert_eq!(bonds, vec![Bond::new(0, 1)]);
    }

    #[test]
    fn two_carbons_at_twice_ideal_distance_form_no_bond() {
        let positions = [Point3::origin(), Point3::new(2.0 * ideal_cc(), 0.0, 0.0)];
        let bonds = compute_covalent_bonds(&positions, &[Element::Carbon; 2], None);
        assert!(bonds.is_empty());
    }

    #[test]
    fn atoms_closer_than_lower_window_are_not_bonded() {
        let positions = [Point3::origin(), Point3::new(0.5, 0.0, 0.0)];
        let bonds = compute_covalent_bonds(&positions, &[Element::Carbon; 2], None);
        assert!(bonds.is_empty());
    }

    #[test]
    fn bonds_are_ordered_unique_and_ascending() {
        // A zig-zag carbon chain plus a methyl-like branch on every atom.
        let mut positions = Vec::new();
        for i in 0..20 {
            let x = i as f32 * 1.3;
            let y = if i % 2 == 0 { 0.0 } else { 0.8 };
            positions.push(Point3::new(x, y, 0.0));
            positions.push(Point3::new(x, y, 1.09));
        }
        let elements: Vec<Element> = (0..positions.len())
            .map(|i| if i % 2 == 0 { Element::Carbon } else { Element::Hydrogen })
            .collect();

        let bonds = compute_covalent_bonds(&positions, &elements, None);
        assert!(!bonds.is_empty());

        let unique: HashSet<Bond> = bonds.iter().copied().collect();
        assert_eq!(unique.len(), bonds.len());
        assert!(bonds.iter().all(|b| b.atom_a < b.atom_b));
        assert!(bonds.windows(2).all(|w| w[0].atom_a <= w[1].atom_a));
        // Every C-H pair at 1.09 is bonded.
        for i in (0..positions.len()).step_by(2) {
            assert!(unique.contains(&Bond::new(i, i + 1)));
        }
    }

    #[test]
    fn residue_indices_restrict_bonds_to_neighbouring_residues() {
        let positions = [Point3::origin(), Point3::new(ideal_cc(), 0.0, 0.0)];
        let elements = [Element::Carbon; 2];

        let adjacent = [Some(3), Some(4)];
        assert_eq!(
            compute_covalent_bonds(&positions, &elements, Some(&adjacent)).len(),
            1
        );

        let distant = [Some(0), Some(2)];
        assert!(compute_covalent_bonds(&positions, &elements, Some(&distant)).is_empty());
    }

    #[test]
    fn unknown_elements_never_bond() {
        let positions = [Point3::origin(), Point3::new(0.2, 0.0, 0.0)];
        let bonds = compute_covalent_bonds(&positions, &[Element::Unknown; 2], None);
        assert!(bonds.is_empty());
    }

    #[test]
    fn custom_criteria_widen_the_window() {
        let positions = [Point3::origin(), Point3::new(ideal_cc() + 0.5, 0.0, 0.0)];
        let elements = [Element::Carbon; 2];
        assert!(compute_covalent_bonds(&positions, &elements, None).is_empty());

        let criteria = CovalentBondCriteria {
            upper_tolerance: 0.6,
            ..Default::default()
        };
        let bonds = compute_covalent_bonds_with(&positions, &elements, None, &criteria);
        assert_eq!(bonds.len(), 1);
    }
}
