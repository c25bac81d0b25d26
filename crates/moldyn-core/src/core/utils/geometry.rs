use nalgebra::{Point3, Vector3};
use std::f32::consts::PI;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl BoundingBox {
    pub fn extent(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }
}

/// Signed torsion angle between the planes (p0, p1, p2) and (p1, p2, p3).
///
/// Follows the IUPAC convention: looking down the p1 -> p2 bond, the angle is
/// positive when the far bond is rotated clockwise relative to the near one. The
/// result lies in (-π, π].
pub fn dihedral_angle(
    p0: &Point3<f32>,
    p1: &Point3<f32>,
    p2: &Point3<f32>,
    p3: &Point3<f32>,
) -> f32 {
    let b1 = p1 - p0;
    let b2 = p2 - p1;
    let b3 = p3 - p2;

    let n1 = b1.cross(&b2);
    let n2 = b2.cross(&b3);

    let y = b2.norm() * b1.dot(&n2);
    let x = n1.dot(&n2);
    let angle = y.atan2(x);
    if angle <= -PI { PI } else { angle }
}

/// Centre of mass, or the plain centroid when no masses are given.
///
/// Returns the origin for an empty point set.
pub fn compute_com(positions: &[Point3<f32>], masses: Option<&[f32]>) -> Point3<f32> {
    if positions.is_empty() {
        return Point3::origin();
    }
    match masses {
        Some(masses) => {
            assert_eq!(positions.len(), masses.len());
            let (weighted, total) = positions
                .iter()
                .zip(masses)
                .fold((Vector3::zeros(), 0.0f32), |(sum, total), (p, &m)| {
                    (sum + p.coords * m, total + m)
                });
            if total > 0.0 {
                Point3::from(weighted / total)
            } else {
                compute_com(positions, None)
            }
        }
        None => {
            let sum: Vector3<f32> = positions.iter().map(|p| p.coords).sum();
            Point3::from(sum / positions.len() as f32)
        }
    }
}

/// Bounding box of a point set, optionally inflated per point by a radius.
pub fn compute_bounding_box(
    positions: &[Point3<f32>],
    radii: Option<&[f32]>,
) -> Option<BoundingBox> {
    if let Some(radii) = radii {
        assert_eq!(positions.len(), radii.len());
    }
    let mut iter = positions.iter().enumerate().map(|(i, p)| {
        let r = radii.map_or(0.0, |radii| radii[i]);
        let r = Vector3::repeat(r);
        (p - r, p + r)
    });
    let (min, max) = iter.next()?;
    let (min, max) = iter.fold((min, max), |(min, max), (lo, hi)| {
        (min.inf(&lo), max.sup(&hi))
    });
    Some(BoundingBox { min, max })
}

/// True if any axis moved by more than half the box between two frames,
/// which indicates the atom was wrapped by the periodic boundary.
pub fn periodic_jump(prev: &Point3<f32>, next: &Point3<f32>, half_box: &Vector3<f32>) -> bool {
    let delta = (next - prev).abs();
    (0..3).any(|axis| half_box[axis] > 0.0 && delta[axis] > half_box[axis])
}

/// Cardinal spline through p1 (s = 0) and p2 (s = 1) with neighbours p0 and p3.
///
/// A tension of 0.5 gives the Catmull-Rom spline.
pub fn cardinal_spline(
    p0: &Vector3<f32>,
    p1: &Vector3<f32>,
    p2: &Vector3<f32>,
    p3: &Vector3<f32>,
    s: f32,
    tension: f32,
) -> Vector3<f32> {
    let v0 = (p2 - p0) * tension;
    let v1 = (p3 - p1) * tension;
    let s2 = s * s;
    let s3 = s2 * s;
    (p1 * 2.0 - p2 * 2.0 + v0 + v1) * s3 + (p1 * -3.0 + p2 * 3.0 - v0 * 2.0 - v1) * s2 + v0 * s + p1
}
