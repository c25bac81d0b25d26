use super::config::SplineConfig;
use crate::core::models::structure::MolecularStructure;
use crate::core::models::topology::BackboneSegment;
use crate::core::utils::geometry::cardinal_spline;
use nalgebra::{Point3, Vector3};

const TANGENT_EPS: f32 = 0.0001;

/// One sample along a backbone ribbon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplineSegment {
    pub position: Point3<f32>,
    pub tangent: Vector3<f32>,
    pub normal: Vector3<f32>,
    pub binormal: Vector3<f32>,
    /// Alpha carbon whose span produced this sample.
    pub atom_index: usize,
    pub color: u32,
}

/// Control points of one channel (CA, O or C) with virtual padding.
///
/// One extrapolated point is prepended and two are appended, so every real
/// point starts a span with valid neighbours on both sides.
fn padded_channel(
    positions: &[Point3<f32>],
    segments: &[BackboneSegment],
    atom: impl Fn(&BackboneSegment) -> usize,
) -> Vec<Vector3<f32>> {
    let n = segments.len();
    let at = |i: usize| positions[atom(&segments[i])].coords;

    let mut points = Vec::with_capacity(n + 3);
    points.push(at(0) - (at(1) - at(0)));
    points.extend((0..n).map(at));
    let d = at(n - 1) - at(n - 2);
    points.push(at(n - 1) + d);
    points.push(at(n - 1) + d * 2.0);
    points
}

/// Builds a smooth ribbon through the alpha carbons of one backbone sequence.
///
/// Each span between consecutive control points is sampled `subdivisions`
/// times, and the final span once more to close the sequence. The orientation
/// frame at each sample is derived from the interpolated carbonyl direction.
/// Fewer than four segments produce no ribbon.
pub fn compute_spline(
    positions: &[Point3<f32>],
    colors: &[u32],
    segments: &[BackboneSegment],
    subdivisions: usize,
    tension: f32,
) -> Vec<SplineSegment> {
    if segments.len() < 4 {
        return Vec::new();
    }
    assert!(subdivisions > 0, "spline needs at least one subdivision");
    assert_eq!(positions.len(), colors.len());

    let ca = padded_channel(positions, segments, |s| s.ca_idx);
    let c = padded_channel(positions, segments, |s| s.c_idx);
    let mut o = padded_channel(positions, segments, |s| s.o_idx);

    let n = segments.len();
    let mut ca_idx = Vec::with_capacity(n + 3);
    ca_idx.push(segments[0].ca_idx);
    ca_idx.extend(segments.iter().map(|s| s.ca_idx));
    ca_idx.extend([segments[n - 1].ca_idx; 2]);

    // Keep the carbonyl direction from flipping 180° between residues.
    for i in 1..o.len() {
        let v0 = o[i - 1] - c[i - 1];
        let v1 = o[i] - c[i];
        if v0.dot(&v1) < 0.0 {
            o[i] = c[i] - v1;
        }
    }

    let spans = ca.len() - 2;
    let mut samples = Vec::with_capacity((spans - 1) * subdivisions + 1);
    for i in 1..spans {
        let window = |ch: &[Vector3<f32>]| [ch[i - 1], ch[i], ch[i + 1], ch[i + 2]];
        let [p0, p1, p2, p3] = window(&ca);
        let [o0, o1, o2, o3] = window(&o);
        let [c0, c1, c2, c3] = window(&c);
        let curve = |t: f32| cardinal_spline(&p0, &p1, &p2, &p3, t, tension);

        let atom_index = ca_idx[i];
        let color = colors[atom_index];
        let count = if i == spans - 1 { subdivisions + 1 } else { subdivisions };

        for step in 0..count {
            let t = step as f32 / subdivisions as f32;
            let p = curve(t);
            let o_t = cardinal_spline(&o0, &o1, &o2, &o3, t, tension);
            let c_t = cardinal_spline(&c0, &c1, &c2, &c3, t, tension);

            let v_dir = (o_t - c_t).normalize();
            let tangent =
                (curve((t + TANGENT_EPS).min(1.0)) - curve((t - TANGENT_EPS).max(0.0))).normalize();
            let normal = v_dir.cross(&tangent).normalize();
            let binormal = tangent.cross(&normal).normalize();

            samples.push(SplineSegment {
                position: Point3::from(p),
                tangent,
                normal,
                binormal,
                atom_index,
                color,
            });
        }
    }
    samples
}

/// One ribbon per backbone sequence of the structure, at the given positions.
pub fn compute_structure_splines(
    structure: &MolecularStructure,
    positions: &[Point3<f32>],
    colors: &[u32],
    config: &SplineConfig,
) -> Vec<Vec<SplineSegment>> {
    structure
        .backbone_sequences()
        .iter()
        .map(|sequence| {
            let segments = structure.sequence_segments(sequence);
            compute_spline(positions, colors, &segments, config.subdivisions, config.tension)
        })
        .filter(|run| !run.is_empty())
        .collect()
}
