use super::playback::PlaybackState;
use super::topology::{TopologySummary, build_topology};
use crate::core::coloring::compute_atom_colors;
use crate::core::io::traits::FrameSource;
use crate::core::models::structure::MolecularStructure;
use crate::core::models::topology::BackboneAngles;
use crate::engine::angles::{BackboneAnglesTrajectory, compute_structure_angles};
use crate::engine::config::AnalysisConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use crate::engine::spline::{SplineSegment, compute_structure_splines};
use crate::engine::tasks::angles_trajectory::AngleWorker;
use crate::engine::tasks::load_trajectory::{LoadOutcome, spawn_trajectory_loader};
use crate::engine::trajectory::Trajectory;
use crate::engine::worker::{Completion, TaskHandle};
use nalgebra::{Point3, Vector3};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const ANGLE_POLL_INTERVAL: Duration = Duration::from_millis(2);

/// Playback seconds between angle passes requested while frames are streaming.
pub const ANGLE_REFRESH_INTERVAL: f64 = 3.0;

/// A loaded structure together with its trajectory and everything derived from it.
///
/// The session owns the two background workers: the loader streams frames into
/// the shared trajectory while the angle worker extends the angle table. The
/// main thread drives playback through [`DynamicsSession::update`] and reads
/// whatever has been published so far.
pub struct DynamicsSession {
    config: AnalysisConfig,
    structure: Arc<MolecularStructure>,
    topology: TopologySummary,
    trajectory: Arc<Trajectory>,
    angle_worker: Arc<AngleWorker>,
    loader: Option<TaskHandle<LoadOutcome>>,
    loader_completion: Completion,
    colors: Vec<u32>,
    positions: Vec<Point3<f32>>,
    velocities: Vec<Vector3<f32>>,
    since_angle_refresh: f64,
    pub playback: PlaybackState,
}

impl DynamicsSession {
    /// Derives the topology of `structure` and starts streaming `source` on the
    /// loader thread.
    #[instrument(skip_all, name = "dynamics_session_open")]
    pub fn open(
        mut structure: MolecularStructure,
        source: Box<dyn FrameSource>,
        config: AnalysisConfig,
        reporter: ProgressReporter<'static>,
    ) -> Result<Self, EngineError> {
        if source.atom_count() != structure.atom_count() {
            return Err(EngineError::AtomCountMismatch {
                expected: structure.atom_count(),
                found: source.atom_count(),
            });
        }
        let capacity = source
            .expected_frames()
            .ok_or(EngineError::UnknownFrameCount)?;

        let topology = build_topology(&mut structure, &config.bonds);
        let colors = compute_atom_colors(&structure, config.coloring);
        let positions = structure.positions().to_vec();
        let velocities = vec![Vector3::zeros(); positions.len()];

        let structure = Arc::new(structure);
        let trajectory = Arc::new(Trajectory::with_capacity(structure.atom_count(), capacity));
        let table = Arc::new(BackboneAnglesTrajectory::for_structure(&structure, &trajectory));
        let angle_worker = Arc::new(AngleWorker::new(
            Arc::clone(&structure),
            Arc::clone(&trajectory),
            table,
        ));

        let loader_completion = Completion::new();
        let loader = {
            let angle_worker = Arc::clone(&angle_worker);
            spawn_trajectory_loader(
                source,
                Arc::clone(&trajectory),
                loader_completion.clone(),
                reporter,
                move || {
                    if let Err(e) = angle_worker.request_update() {
                        warn!(error = %e, "Could not start backbone angle pass.");
                    }
                },
            )?
        };
        info!(
            atoms = structure.atom_count(),
            expected_frames = capacity,
            "Dynamics session opened."
        );

        Ok(Self {
            playback: PlaybackState::new(&config.playback),
            config,
            structure,
            topology,
            trajectory,
            angle_worker,
            loader: Some(loader),
            loader_completion,
            colors,
            positions,
            velocities,
            since_angle_refresh: 0.0,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn structure(&self) -> &MolecularStructure {
        &self.structure
    }

    pub fn topology(&self) -> TopologySummary {
        self.topology
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    pub fn angle_table(&self) -> &BackboneAnglesTrajectory {
        self.angle_worker.table()
    }

    pub fn loader_completion(&self) -> f32 {
        self.loader_completion.get()
    }

    pub fn angle_completion(&self) -> f32 {
        self.angle_worker.completion()
    }

    pub fn is_loading(&self) -> bool {
        self.loader.as_ref().is_some_and(TaskHandle::is_running)
    }

    /// Asks the angle worker to catch up with the frames loaded so far.
    pub fn request_angle_update(&self) -> Result<(), EngineError> {
        self.angle_worker.request_update()
    }

    pub fn is_computing_angles(&self) -> bool {
        self.angle_worker.is_running()
    }

    /// Blocks until the angle table covers every frame loaded so far.
    ///
    /// Returns immediately for structures without a backbone.
    pub fn wait_for_angles(&self) -> Result<(), EngineError> {
        let table = self.angle_table();
        let target = self.trajectory.num_frames().min(table.capacity());
        while table.num_segments() > 0 && table.num_frames() < target {
            if !self.angle_worker.is_running() {
                self.angle_worker.request_update()?;
            }
            thread::sleep(ANGLE_POLL_INTERVAL);
        }
        Ok(())
    }

    /// Blocks until the loader has finished streaming.
    pub fn wait_for_loader(&mut self) -> Result<Option<LoadOutcome>, EngineError> {
        self.loader.take().map(TaskHandle::join).transpose()
    }

    /// Advances playback by `dt` seconds and refreshes the current positions.
    ///
    /// While the loader is running, an angle pass is requested every
    /// [`ANGLE_REFRESH_INTERVAL`] seconds of accumulated `dt`.
    ///
    /// Returns `false` without touching the positions while no frame has been
    /// loaded yet.
    pub fn update(&mut self, dt: f64) -> Result<bool, EngineError> {
        self.tick_angle_refresh(dt)?;

        let num_frames = self.trajectory.num_frames();
        self.playback.advance(dt, num_frames);
        for (velocity, position) in self.velocities.iter_mut().zip(&self.positions) {
            *velocity = position.coords;
        }
        match self.playback.update_positions(&mut self.positions, &self.trajectory) {
            Ok(()) => {
                for (velocity, position) in self.velocities.iter_mut().zip(&self.positions) {
                    *velocity = position.coords - *velocity;
                }
                Ok(true)
            }
            Err(e) => {
                self.velocities.fill(Vector3::zeros());
                match e {
                    EngineError::EmptyTrajectory => {
                        debug!("No frames loaded yet; skipping position update.");
                        Ok(false)
                    }
                    e => Err(e),
                }
            }
        }
    }

    fn tick_angle_refresh(&mut self, dt: f64) -> Result<(), EngineError> {
        if !self.is_loading() {
            self.since_angle_refresh = 0.0;
            return Ok(());
        }
        self.since_angle_refresh += dt;
        if self.since_angle_refresh >= ANGLE_REFRESH_INTERVAL {
            self.since_angle_refresh = 0.0;
            debug!(
                frames = self.trajectory.num_frames(),
                "Refreshing backbone angles during loading."
            );
            self.angle_worker.request_update()?;
        }
        Ok(())
    }

    /// Positions at the current playback time.
    pub fn positions(&self) -> &[Point3<f32>] {
        &self.positions
    }

    /// Per-atom displacement made by the last [`update`](Self::update).
    pub fn velocities(&self) -> &[Vector3<f32>] {
        &self.velocities
    }

    pub fn colors(&self) -> &[u32] {
        &self.colors
    }

    /// Backbone angles at the current (interpolated) positions.
    pub fn current_angles(&self) -> Vec<BackboneAngles> {
        compute_structure_angles(&self.structure, &self.positions)
    }

    /// Backbone ribbons at the current positions, one run per sequence.
    pub fn current_splines(&self) -> Vec<Vec<SplineSegment>> {
        compute_structure_splines(
            &self.structure,
            &self.positions,
            &self.colors,
            &self.config.spline,
        )
    }

    /// Stops both workers, waiting for their current unit of work.
    pub fn shutdown(mut self) -> Result<(), EngineError> {
        self.stop_workers()
    }

    fn stop_workers(&mut self) -> Result<(), EngineError> {
        if let Some(loader) = self.loader.take() {
            let outcome = loader.stop_and_join()?;
            debug!(?outcome, "Trajectory loader stopped.");
        }
        self.angle_worker.stop()
    }
}

impl Drop for DynamicsSession {
    fn drop(&mut self) {
        if let Err(e) = self.stop_workers() {
            warn!(error = %e, "Background workers did not stop cleanly.");
        }
    }
}
