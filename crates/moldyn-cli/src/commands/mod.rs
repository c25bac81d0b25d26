pub mod angles;
pub mod interpolate;
pub mod spline;
pub mod topology;

use crate::error::{CliError, Result};
use crate::utils::progress::LoadProgress;
use moldyn::core::io::csv::{CsvAtomFile, CsvTrajectoryReader};
use moldyn::core::io::traits::{FrameSource, MolecularFile};
use moldyn::core::models::structure::MolecularStructure;
use moldyn::engine::config::PlaybackConfig;
use moldyn::engine::interpolation::InterpolationMode;
use moldyn::engine::progress::ProgressReporter;
use moldyn::engine::tasks::load_trajectory::{LoadOutcome, spawn_trajectory_loader};
use moldyn::engine::trajectory::Trajectory;
use moldyn::engine::worker::Completion;
use moldyn::workflows::playback::PlaybackState;
use nalgebra::Point3;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) fn load_structure(path: &Path) -> Result<MolecularStructure> {
    info!("Loading atom table from {:?}", path);
    CsvAtomFile::read_from_path(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

pub(crate) fn open_trajectory(
    path: &Path,
    atom_count: usize,
) -> Result<CsvTrajectoryReader<std::fs::File>> {
    CsvTrajectoryReader::from_path(path, atom_count).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

/// Streams the whole trajectory on the loader worker and waits for it.
pub(crate) fn load_trajectory(path: &Path, atom_count: usize) -> Result<Arc<Trajectory>> {
    let source = open_trajectory(path, atom_count)?;
    let capacity = source.expected_frames().unwrap_or(0);
    let trajectory = Arc::new(Trajectory::with_capacity(atom_count, capacity));

    let progress = LoadProgress::new(capacity, false);
    let loader = spawn_trajectory_loader(
        Box::new(source),
        Arc::clone(&trajectory),
        Completion::new(),
        ProgressReporter::new(),
        || {},
    )?;
    progress.follow_loader(&loader, &trajectory);
    let outcome = loader.join()?;
    progress.finish();

    match outcome {
        LoadOutcome::Completed { frames } => {
            info!(frames, "Trajectory loaded.");
            Ok(trajectory)
        }
        other => Err(CliError::TrajectoryIncomplete {
            path: path.to_path_buf(),
            frames: other.frames(),
        }),
    }
}

/// Positions at `time` (in frames), clamped to the loaded range.
pub(crate) fn positions_at(
    trajectory: &Trajectory,
    time: f64,
    interpolation: InterpolationMode,
) -> Result<Vec<Point3<f32>>> {
    let mut playback = PlaybackState::new(&PlaybackConfig {
        interpolation,
        ..Default::default()
    });
    playback.seek(time);
    playback.advance(0.0, trajectory.num_frames());
    if playback.time != time {
        warn!(
            requested = time,
            used = playback.time,
            "Time lies outside the trajectory; clamped."
        );
    }

    let mut positions = vec![Point3::origin(); trajectory.atom_count()];
    playback.update_positions(&mut positions, trajectory)?;
    Ok(positions)
}
