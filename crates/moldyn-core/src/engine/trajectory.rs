use super::error::EngineError;
use crate::core::models::frame::TrajectoryFrame;
use nalgebra::Point3;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Append-only frame storage shared between one writer and many readers.
///
/// Slots are allocated up front. The writer fills the next slot and then
/// publishes it by bumping `num_frames` with release ordering; readers load the
/// counter with acquire ordering and only ever touch slots below it, so they
/// always see fully written frames without taking a lock.
#[derive(Debug)]
pub struct Trajectory {
    atom_count: usize,
    frames: Box<[OnceLock<TrajectoryFrame>]>,
    num_frames: AtomicUsize,
}

impl Trajectory {
    pub fn with_capacity(atom_count: usize, capacity: usize) -> Self {
        Self {
            atom_count,
            frames: (0..capacity).map(|_| OnceLock::new()).collect(),
            num_frames: AtomicUsize::new(0),
        }
    }

    /// Builds a fully loaded trajectory from in-memory frames.
    pub fn from_frames(atom_count: usize, frames: Vec<TrajectoryFrame>) -> Result<Self, EngineError> {
        let trajectory = Self::with_capacity(atom_count, frames.len());
        for frame in frames {
            trajectory.push_frame(frame)?;
        }
        Ok(trajectory)
    }

    pub fn atom_count(&self) -> usize {
        self.atom_count
    }

    pub fn capacity(&self) -> usize {
        self.frames.len()
    }

    /// Number of frames published so far.
    pub fn num_frames(&self) -> usize {
        self.num_frames.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.num_frames() == 0
    }

    pub fn is_complete(&self) -> bool {
        self.num_frames() == self.capacity()
    }

    pub fn frame(&self, index: usize) -> Option<&TrajectoryFrame> {
        if index < self.num_frames() {
            self.frames[index].get()
        } else {
            None
        }
    }

    pub fn positions(&self, index: usize) -> Option<&[Point3<f32>]> {
        self.frame(index).map(|f| f.positions.as_slice())
    }

    /// Appends a frame and publishes it to readers. Returns the frame index.
    ///
    /// Only one thread may push at a time.
    pub fn push_frame(&self, frame: TrajectoryFrame) -> Result<usize, EngineError> {
        if frame.atom_count() != self.atom_count {
            return Err(EngineError::AtomCountMismatch {
                expected: self.atom_count,
                found: frame.atom_count(),
            });
        }
        let index = self.num_frames.load(Ordering::Relaxed);
        let slot = self.frames.get(index).ok_or(EngineError::TrajectoryFull {
            capacity: self.capacity(),
        })?;
        assert!(
            slot.set(frame).is_ok(),
            "trajectory frame {index} written twice; push_frame has a single writer"
        );
        self.num_frames.store(index + 1, Ordering::Release);
        Ok(index)
    }
}
