//! Plain CSV interchange.
//!
//! Atom table, one row per atom, residues as consecutive rows sharing
//! `residue_id` and `residue_name` (an empty `residue_id` means no residue):
//!
//! ```text
//! label,element,residue_id,residue_name,x,y,z
//! N,N,1,ALA,0.0,0.0,0.0
//! ```
//!
//! Trajectory, one row per atom per frame in atom order. The box columns repeat
//! on every row and the first row of each frame is authoritative:
//!
//! ```text
//! frame,x,y,z,box_x,box_y,box_z
//! 0,0.0,0.0,0.0,30.0,30.0,30.0
//! ```

use super::traits::{FrameSource, FrameSourceError, MolecularFile};
use crate::core::models::atom::Element;
use crate::core::models::frame::TrajectoryFrame;
use crate::core::models::simulation_box::SimulationBox;
use crate::core::models::structure::{MolecularStructure, StructureBuilder, StructureError};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CsvFileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("Inconsistent structure: {0}")]
    Structure(#[from] StructureError),
}

#[derive(Debug, Serialize, Deserialize)]
struct AtomRecord {
    label: String,
    element: String,
    residue_id: Option<isize>,
    residue_name: String,
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct TrajectoryRecord {
    frame: usize,
    x: f32,
    y: f32,
    z: f32,
    box_x: f32,
    box_y: f32,
    box_z: f32,
}

/// The CSV atom table format.
pub struct CsvAtomFile;

impl MolecularFile for CsvAtomFile {
    type Error = CsvFileError;

    fn read_from(reader: impl Read) -> Result<MolecularStructure, Self::Error> {
        let mut reader = ::csv::ReaderBuilder::new()
            .trim(::csv::Trim::All)
            .from_reader(reader);

        let mut builder = StructureBuilder::new();
        let mut open_residue: Option<(isize, String)> = None;
        for result in reader.deserialize::<AtomRecord>() {
            let record = result?;
            match record.residue_id {
                Some(id) => {
                    let key = (id, record.residue_name.clone());
                    if open_residue.as_ref() != Some(&key) {
                        builder.start_residue(id, &record.residue_name);
                        open_residue = Some(key);
                    }
                }
                None => {
                    if open_residue.take().is_some() {
                        builder.end_residue();
                    }
                }
            }
            let element = if record.element.is_empty() {
                Element::from_atom_label(&record.label)
            } else {
                Element::from_symbol(&record.element)
            };
            builder.add_atom(
                &record.label,
                element,
                Point3::new(record.x, record.y, record.z),
            );
        }
        Ok(builder.build()?)
    }

    fn write_to(structure: &MolecularStructure, writer: impl Write) -> Result<(), Self::Error> {
        let mut writer = ::csv::Writer::from_writer(writer);
        for i in 0..structure.atom_count() {
            let residue = structure.residue_indices()[i].map(|r| &structure.residues()[r]);
            let p = structure.positions()[i];
            writer.serialize(AtomRecord {
                label: structure.labels()[i].clone(),
                element: structure.elements()[i].symbol().to_string(),
                residue_id: residue.map(|r| r.id),
                residue_name: residue.map(|r| r.name.clone()).unwrap_or_default(),
                x: p.x,
                y: p.y,
                z: p.z,
            })?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Streams frames from a CSV trajectory.
pub struct CsvTrajectoryReader<R: Read> {
    records: ::csv::DeserializeRecordsIntoIter<R, TrajectoryRecord>,
    pending: Option<TrajectoryRecord>,
    atom_count: usize,
    expected_frames: Option<usize>,
    frames_read: usize,
}

impl CsvTrajectoryReader<File> {
    /// Opens a trajectory file, counting its rows once to know the frame count.
    pub fn from_path<P: AsRef<Path>>(path: P, atom_count: usize) -> Result<Self, CsvFileError> {
        let rows = ::csv::Reader::from_path(path.as_ref())?.records().count();
        let expected = (atom_count > 0).then(|| rows / atom_count);
        let file = File::open(path)?;
        Ok(Self::new(file, atom_count).with_expected_frames(expected))
    }
}

impl<R: Read> CsvTrajectoryReader<R> {
    pub fn new(reader: R, atom_count: usize) -> Self {
        let reader = ::csv::ReaderBuilder::new()
            .trim(::csv::Trim::All)
            .from_reader(reader);
        Self {
            records: reader.into_deserialize(),
            pending: None,
            atom_count,
            expected_frames: None,
            frames_read: 0,
        }
    }

    pub fn with_expected_frames(mut self, expected: Option<usize>) -> Self {
        self.expected_frames = expected;
        self
    }

    fn next_record(&mut self) -> Result<Option<TrajectoryRecord>, FrameSourceError> {
        if let Some(record) = self.pending.take() {
            return Ok(Some(record));
        }
        Ok(self.records.next().transpose()?)
    }
}

impl<R: Read + Send> FrameSource for CsvTrajectoryReader<R> {
    fn atom_count(&self) -> usize {
        self.atom_count
    }

    fn expected_frames(&self) -> Option<usize> {
        self.expected_frames
    }

    fn read_next_frame(&mut self) -> Result<Option<TrajectoryFrame>, FrameSourceError> {
        let Some(first) = self.next_record()? else {
            return Ok(None);
        };
        let frame_id = first.frame;
        let sim_box = SimulationBox::orthorhombic(Vector3::new(first.box_x, first.box_y, first.box_z));
        let mut positions = Vec::with_capacity(self.atom_count);
        positions.push(Point3::new(first.x, first.y, first.z));

        while let Some(record) = self.next_record()? {
            if record.frame != frame_id {
                self.pending = Some(record);
                break;
            }
            positions.push(Point3::new(record.x, record.y, record.z));
        }

        if positions.len() != self.atom_count {
            return Err(FrameSourceError::AtomCountMismatch {
                frame: self.frames_read,
                expected: self.atom_count,
                found: positions.len(),
            });
        }
        self.frames_read += 1;
        Ok(Some(TrajectoryFrame::new(positions, sim_box)))
    }
}

/// Writes frames in the CSV trajectory layout.
pub fn write_trajectory(frames: &[TrajectoryFrame], writer: impl Write) -> Result<(), CsvFileError> {
    let mut writer = ::csv::Writer::from_writer(writer);
    for (frame, data) in frames.iter().enumerate() {
        let extent = data.sim_box.extent();
        for p in &data.positions {
            writer.serialize(TrajectoryRecord {
                frame,
                x: p.x,
                y: p.y,
                z: p.z,
                box_x: extent.x,
                box_y: extent.y,
                box_z: extent.z,
            })?;
        }
    }
    writer.flush()?;
    Ok(())
}
