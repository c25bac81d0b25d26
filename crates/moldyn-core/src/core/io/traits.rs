use crate::core::models::frame::TrajectoryFrame;
use crate::core::models::structure::MolecularStructure;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use thiserror::Error;

/// Reading and writing of a structure file format.
///
/// Implementors handle the format-specific parsing; path-based convenience
/// methods are provided on top of the reader/writer methods.
pub trait MolecularFile {
    type Error: Error + From<io::Error>;

    fn read_from(reader: impl Read) -> Result<MolecularStructure, Self::Error>;

    fn write_to(structure: &MolecularStructure, writer: impl Write) -> Result<(), Self::Error>;

    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<MolecularStructure, Self::Error> {
        let file = File::open(path)?;
        Self::read_from(BufReader::new(file))
    }

    fn write_to_path<P: AsRef<Path>>(
        structure: &MolecularStructure,
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        Self::write_to(structure, BufWriter::new(file))
    }
}

#[derive(Debug, Error)]
pub enum FrameSourceError {
    #[error("I/O error while reading trajectory: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error while reading trajectory: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("Frame {frame} has {found} atoms, expected {expected}")]
    AtomCountMismatch {
        frame: usize,
        expected: usize,
        found: usize,
    },
}

/// A stream of trajectory frames, read one at a time.
///
/// Sources are moved onto the loader worker thread, hence the `Send` bound.
/// Reading may block on I/O.
pub trait FrameSource: Send {
    /// Number of atoms in every frame.
    fn atom_count(&self) -> usize;

    /// Total number of frames, if known up front.
    fn expected_frames(&self) -> Option<usize>;

    /// Reads the next frame, or `None` once the stream is exhausted.
    fn read_next_frame(&mut self) -> Result<Option<TrajectoryFrame>, FrameSourceError>;
}
