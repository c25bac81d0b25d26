//! Periodic-boundary-aware interpolation of atom positions between frames.
//!
//! Positions are blended in single precision; the playback time that selects
//! the frames and the blend fraction is double precision. Unwrapping uses only
//! the diagonal of the simulation box: for each axis independently, a point
//! more than half a box length away from its reference is shifted by one box
//! length toward it before blending.

use super::error::EngineError;
use super::trajectory::Trajectory;
use crate::core::utils::geometry::cardinal_spline;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

const CUBIC_TENSION: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterpolationMode {
    Nearest,
    Linear,
    LinearPeriodic,
    Cubic,
    #[default]
    CubicPeriodic,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid interpolation mode '{0}'")]
pub struct ParseInterpolationModeError(String);

impl FromStr for InterpolationMode {
    type Err = ParseInterpolationModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "nearest" => Ok(Self::Nearest),
            "linear" => Ok(Self::Linear),
            "linear-periodic" => Ok(Self::LinearPeriodic),
            "cubic" => Ok(Self::Cubic),
            "cubic-periodic" => Ok(Self::CubicPeriodic),
            _ => Err(ParseInterpolationModeError(s.to_string())),
        }
    }
}

impl fmt::Display for InterpolationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Nearest => "nearest",
            Self::Linear => "linear",
            Self::LinearPeriodic => "linear-periodic",
            Self::Cubic => "cubic",
            Self::CubicPeriodic => "cubic-periodic",
        })
    }
}

/// Shifts `p` by whole box lengths, per axis, so that it lies within half a box
/// of `reference`. Axes with a non-positive extent are left untouched.
#[inline]
pub fn de_periodize(reference: &Point3<f32>, p: &Point3<f32>, extent: &Vector3<f32>) -> Point3<f32> {
    let mut out = *p;
    for axis in 0..3 {
        let full = extent[axis];
        let delta = p[axis] - reference[axis];
        if full > 0.0 && delta.abs() > full * 0.5 {
            out[axis] -= delta.signum() * full;
        }
    }
    out
}

#[inline]
fn mix(a: &Point3<f32>, b: &Point3<f32>, t: f32) -> Point3<f32> {
    Point3::from(a.coords * (1.0 - t) + b.coords * t)
}

fn for_each_atom<F>(dst: &mut [Point3<f32>], f: F)
where
    F: Fn(usize) -> Point3<f32> + Sync + Send,
{
    #[cfg(feature = "parallel")]
    dst.par_iter_mut().enumerate().for_each(|(i, out)| *out = f(i));
    #[cfg(not(feature = "parallel"))]
    dst.iter_mut().enumerate().for_each(|(i, out)| *out = f(i));
}

pub fn linear(dst: &mut [Point3<f32>], prev: &[Point3<f32>], next: &[Point3<f32>], t: f32) {
    assert_eq!(prev.len(), dst.len());
    assert_eq!(next.len(), dst.len());
    for_each_atom(dst, |i| mix(&prev[i], &next[i], t));
}

pub fn linear_periodic(
    dst: &mut [Point3<f32>],
    prev: &[Point3<f32>],
    next: &[Point3<f32>],
    t: f32,
    extent: &Vector3<f32>,
) {
    assert_eq!(prev.len(), dst.len());
    assert_eq!(next.len(), dst.len());
    for_each_atom(dst, |i| {
        let next = de_periodize(&prev[i], &next[i], extent);
        mix(&prev[i], &next, t)
    });
}

/// Catmull-Rom interpolation between `p1` (t = 0) and `p2` (t = 1).
pub fn cubic(
    dst: &mut [Point3<f32>],
    [p0, p1, p2, p3]: [&[Point3<f32>]; 4],
    t: f32,
) {
    for p in [p0, p1, p2, p3] {
        assert_eq!(p.len(), dst.len());
    }
    for_each_atom(dst, |i| {
        Point3::from(cardinal_spline(
            &p0[i].coords,
            &p1[i].coords,
            &p2[i].coords,
            &p3[i].coords,
            t,
            CUBIC_TENSION,
        ))
    });
}

/// Like [`cubic`], with `p0`, `p2` and `p3` each unwrapped against `p1`.
pub fn cubic_periodic(
    dst: &mut [Point3<f32>],
    [p0, p1, p2, p3]: [&[Point3<f32>]; 4],
    t: f32,
    extent: &Vector3<f32>,
) {
    for p in [p0, p1, p2, p3] {
        assert_eq!(p.len(), dst.len());
    }
    for_each_atom(dst, |i| {
        let reference = &p1[i];
        let q0 = de_periodize(reference, &p0[i], extent);
        let q2 = de_periodize(reference, &p2[i], extent);
        let q3 = de_periodize(reference, &p3[i], extent);
        Point3::from(cardinal_spline(
            &q0.coords,
            &reference.coords,
            &q2.coords,
            &q3.coords,
            t,
            CUBIC_TENSION,
        ))
    });
}

/// Keyframes selected for a playback time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameWindow {
    pub prev2: usize,
    pub prev1: usize,
    pub next1: usize,
    pub next2: usize,
    /// Blend fraction between `prev1` and `next1`.
    pub t: f32,
    /// Time after clamping to `[0, last_frame]`.
    pub time: f64,
}

impl FrameWindow {
    /// Clamps `time` into the trajectory and picks the surrounding frames,
    /// repeating the boundary frame at either end.
    pub fn new(time: f64, num_frames: usize) -> Self {
        assert!(num_frames > 0);
        let last = num_frames - 1;
        let time = if time.is_nan() { 0.0 } else { time.clamp(0.0, last as f64) };
        let frame = time as usize;
        Self {
            prev2: frame.saturating_sub(1),
            prev1: frame,
            next1: (frame + 1).min(last),
            next2: (frame + 2).min(last),
            t: time.fract() as f32,
            time,
        }
    }

    pub fn nearest(&self, num_frames: usize) -> usize {
        ((self.time + 0.5) as usize).min(num_frames - 1)
    }
}

/// Writes the positions at playback `time` into `dst`.
///
/// Out-of-range times are clamped. The simulation box of the frame at or
/// before `time` drives the periodic modes. Integer times reproduce the stored
/// frame exactly.
pub fn interpolate_positions(
    dst: &mut [Point3<f32>],
    trajectory: &Trajectory,
    time: f64,
    mode: InterpolationMode,
) -> Result<(), EngineError> {
    let num_frames = trajectory.num_frames();
    if num_frames == 0 {
        return Err(EngineError::EmptyTrajectory);
    }
    if dst.len() != trajectory.atom_count() {
        return Err(EngineError::AtomCountMismatch {
            expected: trajectory.atom_count(),
            found: dst.len(),
        });
    }

    let window = FrameWindow::new(time, num_frames);
    let frame = |i: usize| trajectory.frame(i).ok_or(EngineError::EmptyTrajectory);
    let positions = |i: usize| frame(i).map(|f| f.positions.as_slice());

    if window.prev1 == window.next1 {
        dst.copy_from_slice(positions(window.prev1)?);
        return Ok(());
    }

    let extent = frame(window.prev1)?.sim_box.extent();
    let t = window.t;
    match mode {
        InterpolationMode::Nearest => {
            dst.copy_from_slice(positions(window.nearest(num_frames))?);
        }
        InterpolationMode::Linear => {
            linear(dst, positions(window.prev1)?, positions(window.next1)?, t);
        }
        InterpolationMode::LinearPeriodic => {
            linear_periodic(dst, positions(window.prev1)?, positions(window.next1)?, t, &extent);
        }
        InterpolationMode::Cubic => {
            let keys = [
                positions(window.prev2)?,
                positions(window.prev1)?,
                positions(window.next1)?,
                positions(window.next2)?,
            ];
            cubic(dst, keys, t);
        }
        InterpolationMode::CubicPeriodic => {
            let keys = [
                positions(window.prev2)?,
                positions(window.prev1)?,
                positions(window.next1)?,
                positions(window.next2)?,
            ];
            cubic_periodic(dst, keys, t, &extent);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::frame::TrajectoryFrame;
    use crate::core::models::simulation_box::SimulationBox;

    const BOX: f32 = 10.0;

    fn extent() -> Vector3<f32> {
        Vector3::repeat(BOX)
    }

    fn trajectory(xs: &[f32]) -> Trajectory {
        let frames = xs
            .iter()
            .map(|&x| {
                TrajectoryFrame::new(
                    vec![Point3::new(x, 5.0, 5.0)],
                    SimulationBox::orthorhombic(extent()),
                )
            })
            .collect();
        Trajectory::from_frames(1, frames).unwrap()
    }

    #[test]
    fn de_periodize_shifts_only_axes_beyond_half_box() {
        let reference = Point3::new(9.5, 5.0, 1.0);
        let p = Point3::new(0.5, 6.0, 9.0);
        let out = de_periodize(&reference, &p, &extent());
        assert_eq!(out, Point3::new(10.5, 6.0, -1.0));
    }

    #[test]
    fn de_periodize_leaves_exact_half_box_delta_alone() {
        let out = de_periodize(&Point3::new(0.0, 0.0, 0.0), &Point3::new(5.0, 0.0, 0.0), &extent());
        assert_eq!(out.x, 5.0);
    }

    #[test]
    fn de_periodize_ignores_non_periodic_axes() {
        let out = de_periodize(&Point3::origin(), &Point3::new(50.0, 0.0, 0.0), &Vector3::zeros());
        assert_eq!(out.x, 50.0);
    }

    #[test]
    fn linear_periodic_takes_short_path_across_boundary() {
        let mut dst = [Point3::origin()];
        linear_periodic(
            &mut dst,
            &[Point3::new(9.5, 5.0, 5.0)],
            &[Point3::new(0.5, 5.0, 5.0)],
            0.5,
            &extent(),
        );
        assert!((dst[0].x - 10.0).abs() < 1e-5);

        linear(
            &mut dst,
            &[Point3::new(9.5, 5.0, 5.0)],
            &[Point3::new(0.5, 5.0, 5.0)],
            0.5,
        );
        assert!((dst[0].x - 5.0).abs() < 1e-5);
    }

    #[test]
    fn integer_times_reproduce_frames_exactly() {
        let trajectory = trajectory(&[9.5, 0.5]);
        let mut dst = [Point3::origin()];

        interpolate_positions(&mut dst, &trajectory, 0.0, InterpolationMode::LinearPeriodic).unwrap();
        assert_eq!(dst[0], Point3::new(9.5, 5.0, 5.0));

        interpolate_positions(&mut dst, &trajectory, 1.0, InterpolationMode::LinearPeriodic).unwrap();
        assert_eq!(dst[0], Point3::new(0.5, 5.0, 5.0));

        interpolate_positions(&mut dst, &trajectory, 0.5, InterpolationMode::LinearPeriodic).unwrap();
        assert!((dst[0].x - 10.0).abs() < 1e-5);
    }

    #[test]
    fn out_of_range_time_is_clamped() {
        let trajectory = trajectory(&[1.0, 2.0, 3.0]);
        let mut dst = [Point3::origin()];

        interpolate_positions(&mut dst, &trajectory, -4.0, InterpolationMode::Cubic).unwrap();
        assert_eq!(dst[0].x, 1.0);
        interpolate_positions(&mut dst, &trajectory, 99.0, InterpolationMode::Cubic).unwrap();
        assert_eq!(dst[0].x, 3.0);
    }

    #[test]
    fn nearest_rounds_to_closest_frame() {
        let trajectory = trajectory(&[1.0, 2.0, 3.0]);
        let mut dst = [Point3::origin()];
        interpolate_positions(&mut dst, &trajectory, 1.6, InterpolationMode::Nearest).unwrap();
        assert_eq!(dst[0].x, 3.0);
        interpolate_positions(&mut dst, &trajectory, 1.4, InterpolationMode::Nearest).unwrap();
        assert_eq!(dst[0].x, 2.0);
    }

    #[test]
    fn cubic_periodic_unwraps_every_keyframe_against_center() {
        // Constant-velocity motion wrapped by the box: 8, 9, 0 (=10), 1 (=11).
        let trajectory = trajectory(&[8.0, 9.0, 0.0, 1.0]);
        let mut dst = [Point3::origin()];
        interpolate_positions(&mut dst, &trajectory, 1.5, InterpolationMode::CubicPeriodic).unwrap();
        assert!((dst[0].x - 9.5).abs() < 1e-4, "{}", dst[0].x);
    }

    #[test]
    fn single_frame_trajectory_is_copied() {
        let trajectory = trajectory(&[4.0]);
        let mut dst = [Point3::origin()];
        interpolate_positions(&mut dst, &trajectory, 0.7, InterpolationMode::CubicPeriodic).unwrap();
        assert_eq!(dst[0].x, 4.0);
    }

    #[test]
    fn empty_trajectory_is_an_error() {
        let trajectory = Trajectory::with_capacity(1, 4);
        let mut dst = [Point3::origin()];
        assert!(matches!(
            interpolate_positions(&mut dst, &trajectory, 0.0, InterpolationMode::Linear),
            Err(EngineError::EmptyTrajectory)
        ));
    }

    #[test]
    fn frame_window_repeats_boundary_frames() {
        let window = FrameWindow::new(0.25, 3);
        assert_eq!((window.prev2, window.prev1, window.next1, window.next2), (0, 0, 1, 2));
        let window = FrameWindow::new(1.75, 3);
        assert_eq!((window.prev2, window.prev1, window.next1, window.next2), (0, 1, 2, 2));
        assert!((window.t - 0.75).abs() < 1e-6);
    }

    #[test]
    fn interpolation_mode_parses_and_displays_kebab_case() {
        for mode in [
            InterpolationMode::Nearest,
            InterpolationMode::Linear,
            InterpolationMode::LinearPeriodic,
            InterpolationMode::Cubic,
            InterpolationMode::CubicPeriodic,
        ] {
            assert_eq!(mode.to_string().parse::<InterpolationMode>(), Ok(mode));
        }
        assert_eq!("LINEAR_PERIODIC".parse(), Ok(InterpolationMode::LinearPeriodic));
        assert!("spline".parse::<InterpolationMode>().is_err());
    }
}
