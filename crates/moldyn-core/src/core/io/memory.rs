use super::traits::{FrameSource, FrameSourceError};
use crate::core::models::frame::TrajectoryFrame;
use std::collections::VecDeque;

/// A [`FrameSource`] over frames already held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryFrameSource {
    atom_count: usize,
    total: usize,
    frames: VecDeque<TrajectoryFrame>,
}

impl MemoryFrameSource {
    /// # Panics
    ///
    /// Panics if the frames disagree on their atom count.
    pub fn new(frames: Vec<TrajectoryFrame>) -> Self {
        let atom_count = frames.first().map_or(0, TrajectoryFrame::atom_count);
        assert!(
            frames.iter().all(|f| f.atom_count() == atom_count),
            "all frames must have the same atom count"
        );
        Self {
            atom_count,
            total: frames.len(),
            frames: frames.into(),
        }
    }
}

impl FrameSource for MemoryFrameSource {
    fn atom_count(&self) -> usize {
        self.atom_count
    }

    fn expected_frames(&self) -> Option<usize> {
        Some(self.total)
    }

    fn read_next_frame(&mut self) -> Result<Option<TrajectoryFrame>, FrameSourceError> {
        Ok(self.frames.pop_front())
    }
}
