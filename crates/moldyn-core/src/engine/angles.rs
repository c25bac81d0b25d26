use super::trajectory::Trajectory;
use crate::core::models::structure::MolecularStructure;
use crate::core::models::topology::{BackboneAngles, BackboneSegment};
use crate::core::utils::geometry::dihedral_angle;
use nalgebra::Point3;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Backbone torsions of one contiguous sequence of segments.
///
/// The first residue has `omega = phi = 0`, the last has `psi = 0`. Sequences
/// shorter than two residues have no defined torsions and yield zeros.
pub fn compute_backbone_angles(
    positions: &[Point3<f32>],
    segments: &[BackboneSegment],
) -> Vec<BackboneAngles> {
    let mut angles = vec![BackboneAngles::default(); segments.len()];
    compute_backbone_angles_into(&mut angles, positions, segments);
    angles
}

pub fn compute_backbone_angles_into(
    dst: &mut [BackboneAngles],
    positions: &[Point3<f32>],
    segments: &[BackboneSegment],
) {
    assert!(dst.len() >= segments.len());
    let n = segments.len();
    if n < 2 {
        dst[..n].fill(BackboneAngles::default());
        return;
    }

    let p = |i: usize| &positions[i];
    let omega = |prev: &BackboneSegment, cur: &BackboneSegment| {
        dihedral_angle(p(prev.ca_idx), p(prev.c_idx), p(cur.n_idx), p(cur.ca_idx))
    };
    let phi = |prev: &BackboneSegment, cur: &BackboneSegment| {
        dihedral_angle(p(prev.c_idx), p(cur.n_idx), p(cur.ca_idx), p(cur.c_idx))
    };
    let psi = |cur: &BackboneSegment, next: &BackboneSegment| {
        dihedral_angle(p(cur.n_idx), p(cur.ca_idx), p(cur.c_idx), p(next.n_idx))
    };

    dst[0] = BackboneAngles {
        omega: 0.0,
        phi: 0.0,
        psi: psi(&segments[0], &segments[1]),
    };
    for i in 1..n - 1 {
        let (prev, cur, next) = (&segments[i - 1], &segments[i], &segments[i + 1]);
        dst[i] = BackboneAngles {
            omega: omega(prev, cur),
            phi: phi(prev, cur),
            psi: psi(cur, next),
        };
    }
    let (prev, last) = (&segments[n - 2], &segments[n - 1]);
    dst[n - 1] = BackboneAngles {
        omega: omega(prev, last),
        phi: phi(prev, last),
        psi: 0.0,
    };
}

/// Per-residue torsions of a whole structure at the given positions.
///
/// The result is index-aligned with the residues; residues outside every
/// backbone sequence keep zero angles. Empty if the structure has no backbone.
pub fn compute_structure_angles(
    structure: &MolecularStructure,
    positions: &[Point3<f32>],
) -> Vec<BackboneAngles> {
    if !structure.has_backbone() {
        return Vec::new();
    }
    let mut angles = vec![BackboneAngles::default(); structure.residues().len()];
    fill_structure_angles(&mut angles, structure, positions);
    angles
}

fn fill_structure_angles(
    dst: &mut [BackboneAngles],
    structure: &MolecularStructure,
    positions: &[Point3<f32>],
) {
    for sequence in structure.backbone_sequences() {
        let segments = structure.sequence_segments(sequence);
        compute_backbone_angles_into(&mut dst[sequence.residue_range.clone()], positions, &segments);
    }
}

/// Dense `[frame][residue]` table of backbone angles, grown one frame at a time.
///
/// Same publication discipline as [`Trajectory`]: rows are written once by a
/// single writer and become visible to readers through an acquire/release frame
/// counter. Already computed rows are never rewritten; a new structure gets a
/// new table.
#[derive(Debug)]
pub struct BackboneAnglesTrajectory {
    num_segments: usize,
    rows: Box<[OnceLock<Box<[BackboneAngles]>>]>,
    num_frames: AtomicUsize,
}

impl BackboneAnglesTrajectory {
    pub fn new(num_segments: usize, capacity: usize) -> Self {
        Self {
            num_segments,
            rows: (0..capacity).map(|_| OnceLock::new()).collect(),
            num_frames: AtomicUsize::new(0),
        }
    }

    /// A table sized for the structure's backbone and the trajectory's capacity.
    pub fn for_structure(structure: &MolecularStructure, trajectory: &Trajectory) -> Self {
        Self::new(structure.backbone_segments().len(), trajectory.capacity())
    }

    pub fn num_segments(&self) -> usize {
        self.num_segments
    }

    pub fn capacity(&self) -> usize {
        self.rows.len()
    }

    pub fn num_frames(&self) -> usize {
        self.num_frames.load(Ordering::Acquire)
    }

    pub fn frame(&self, index: usize) -> Option<&[BackboneAngles]> {
        if index < self.num_frames() {
            self.rows[index].get().map(|row| &row[..])
        } else {
            None
        }
    }

    /// Computes angles for every trajectory frame not yet in the table.
    ///
    /// The trajectory frame count is read once up front, so frames published
    /// while this runs are left for the next call. Calling again without new
    /// frames is a no-op. Returns the number of frames added.
    ///
    /// Must not run concurrently with itself on the same table.
    pub fn update(&self, structure: &MolecularStructure, trajectory: &Trajectory) -> usize {
        let available = trajectory.num_frames().min(self.capacity());
        let start = self.num_frames.load(Ordering::Relaxed);
        if self.num_segments == 0 || start >= available {
            return 0;
        }
        assert_eq!(
            self.num_segments,
            structure.backbone_segments().len(),
            "angle table does not match the structure's backbone"
        );

        for f in start..available {
            let Some(positions) = trajectory.positions(f) else {
                break;
            };
            let mut row = vec![BackboneAngles::default(); self.num_segments];
            fill_structure_angles(&mut row, structure, positions);
            assert!(
                self.rows[f].set(row.into_boxed_slice()).is_ok(),
                "angle row {f} written twice; update has a single writer"
            );
            self.num_frames.store(f + 1, Ordering::Release);
        }
        debug!(from = start, to = available, "Computed backbone angles for new frames");
        available - start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Element;
    use crate::core::models::frame::TrajectoryFrame;
    use crate::core::models::simulation_box::SimulationBox;
    use crate::core::models::structure::StructureBuilder;
    use crate::workflows::topology::build_topology;
    use crate::core::topology::bonds::CovalentBondCriteria;

    fn segment(base: usize) -> BackboneSegment {
        BackboneSegment {
            n_idx: base,
            ca_idx: base + 1,
            c_idx: base + 2,
            o_idx: base + 3,
        }
    }

    /// Planar zig-zag backbone: every torsion is either 0 or π.
    fn planar_backbone(residues: usize) -> Vec<Point3<f32>> {
        let mut positions = Vec::new();
        for r in 0..residues {
            for k in 0..3 {
                let i = (r * 3 + k) as f32;
                let y = if (r * 3 + k) % 2 == 0 { 0.0 } else { 1.0 };
                positions.push(Point3::new(i * 1.2, y, 0.0));
            }
            positions.push(Point3::new(positions.last().unwrap().x, -1.0, 0.0));
        }
        positions
    }

    #[test]
    fn boundary_residues_have_zero_angles_where_undefined() {
        let positions = planar_backbone(4);
        let segments: Vec<_> = (0..4).map(|r| segment(r * 4)).collect();
        let angles = compute_backbone_angles(&positions, &segments);

        assert_eq!(angles.len(), 4);
        assert_eq!(angles[0].omega, 0.0);
        assert_eq!(angles[0].phi, 0.0);
        assert_eq!(angles[3].psi, 0.0);
    }

    #[test]
    fn planar_zigzag_backbone_is_fully_trans() {
        let positions = planar_backbone(4);
        let segments: Vec<_> = (0..4).map(|r| segment(r * 4)).collect();
        let angles = compute_backbone_angles(&positions, &segments);

        for a in &angles[1..3] {
            for value in [a.omega, a.phi, a.psi] {
                assert!((value.abs() - std::f32::consts::PI).abs() < 1e-4, "{value}");
            }
        }
    }

    #[test]
    fn single_residue_sequence_yields_zero_angles() {
        let positions = planar_backbone(1);
        let angles = compute_backbone_angles(&positions, &[segment(0)]);
        assert_eq!(angles, vec![BackboneAngles::default()]);
    }

    fn peptide() -> MolecularStructure {
        let positions = planar_backbone(5);
        let mut builder = StructureBuilder::new();
        for r in 0..5 {
            builder.start_residue(r as isize + 1, "GLY");
            for (k, (label, element)) in [
                ("N", Element::Nitrogen),
                ("CA", Element::Carbon),
                ("C", Element::Carbon),
                ("O", Element::Oxygen),
            ]
            .into_iter()
            .enumerate()
            {
                builder.add_atom(label, element, positions[r * 4 + k]);
            }
        }
        let mut structure = builder.build().unwrap();
        build_topology(&mut structure, &CovalentBondCriteria::default());
        structure
    }

    fn trajectory_for(structure: &MolecularStructure, frames: usize, capacity: usize) -> Trajectory {
        let trajectory = Trajectory::with_capacity(structure.atom_count(), capacity);
        for f in 0..frames {
            let positions = structure
                .positions()
                .iter()
                .map(|p| p + nalgebra::Vector3::new(0.0, 0.0, f as f32 * 0.1 * p.x))
                .collect();
            trajectory
                .push_frame(TrajectoryFrame::new(positions, SimulationBox::default()))
                .unwrap();
        }
        trajectory
    }

    #[test]
    fn structure_angles_cover_every_residue() {
        let structure = peptide();
        assert!(structure.has_backbone());
        let angles = compute_structure_angles(&structure, structure.positions());
        assert_eq!(angles.len(), 5);
    }

    #[test]
    fn update_is_incremental_and_idempotent() {
        let structure = peptide();
        let trajectory = trajectory_for(&structure, 3, 3);
        let table = BackboneAnglesTrajectory::for_structure(&structure, &trajectory);

        assert_eq!(table.update(&structure, &trajectory), 3);
        let snapshot: Vec<Vec<u32>> = (0..3)
            .map(|f| {
                table
                    .frame(f)
                    .unwrap()
                    .iter()
                    .flat_map(|a| [a.omega.to_bits(), a.phi.to_bits(), a.psi.to_bits()])
                    .collect()
            })
            .collect();

        assert_eq!(table.update(&structure, &trajectory), 0);
        for (f, expected) in snapshot.iter().enumerate() {
            let bits: Vec<u32> = table
                .frame(f)
                .unwrap()
                .iter()
                .flat_map(|a| [a.omega.to_bits(), a.phi.to_bits(), a.psi.to_bits()])
                .collect();
            assert_eq!(&bits, expected);
        }
    }

    #[test]
    fn update_only_processes_newly_published_frames() {
        let structure = peptide();
        let full = trajectory_for(&structure, 4, 4);
        let streaming = Trajectory::with_capacity(structure.atom_count(), 4);
        let table = BackboneAnglesTrajectory::for_structure(&structure, &streaming);

        for f in 0..2 {
            streaming.push_frame(full.frame(f).unwrap().clone()).unwrap();
        }
        assert_eq!(table.update(&structure, &streaming), 2);
        let first_row = table.frame(0).unwrap().to_vec();

        for f in 2..4 {
            streaming.push_frame(full.frame(f).unwrap().clone()).unwrap();
        }
        assert_eq!(table.update(&structure, &streaming), 2);
        assert_eq!(table.num_frames(), 4);
        assert_eq!(table.frame(0).unwrap(), &first_row[..]);
        assert_eq!(
            table.frame(3).unwrap(),
            &compute_structure_angles(&structure, full.positions(3).unwrap())[..]
        );
    }
}
