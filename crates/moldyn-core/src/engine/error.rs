use thiserror::Error;

use crate::core::io::traits::FrameSourceError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Trajectory contains no frames")]
    EmptyTrajectory,

    #[error("Trajectory storage is full ({capacity} frames)")]
    TrajectoryFull { capacity: usize },

    #[error("Frame has {found} atoms, structure has {expected}")]
    AtomCountMismatch { expected: usize, found: usize },

    #[error("Frame source does not report its frame count")]
    UnknownFrameCount,

    #[error("Failed to read trajectory frame: {source}")]
    FrameSource {
        #[from]
        source: FrameSourceError,
    },

    #[error("Failed to spawn background task '{name}': {source}")]
    TaskSpawn {
        name: &'static str,
        source: std::io::Error,
    },

    #[error("Background task '{0}' panicked")]
    TaskPanicked(&'static str),
}
