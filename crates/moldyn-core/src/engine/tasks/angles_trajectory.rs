use crate::core::models::structure::MolecularStructure;
use crate::engine::angles::BackboneAnglesTrajectory;
use crate::engine::error::EngineError;
use crate::engine::trajectory::Trajectory;
use crate::engine::worker::{CancellationToken, Completion, TaskHandle};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument, warn};

const IDLE: u8 = 0;
const RUNNING: u8 = 1;
const RUNNING_WITH_QUERY: u8 = 2;

/// Keeps a [`BackboneAnglesTrajectory`] in step with a growing [`Trajectory`].
///
/// At most one worker thread writes the table. Requests that arrive while it is
/// busy are coalesced into a single extra pass, so a burst of requests during
/// loading costs one pass per burst instead of one thread each.
#[derive(Debug)]
pub struct AngleWorker {
    structure: Arc<MolecularStructure>,
    trajectory: Arc<Trajectory>,
    table: Arc<BackboneAnglesTrajectory>,
    completion: Completion,
    state: Arc<AtomicU8>,
    handle: Mutex<Option<TaskHandle<()>>>,
}

impl AngleWorker {
    pub fn new(
        structure: Arc<MolecularStructure>,
        trajectory: Arc<Trajectory>,
        table: Arc<BackboneAnglesTrajectory>,
    ) -> Self {
        Self {
            structure,
            trajectory,
            table,
            completion: Completion::new(),
            state: Arc::new(AtomicU8::new(IDLE)),
            handle: Mutex::new(None),
        }
    }

    pub fn table(&self) -> &Arc<BackboneAnglesTrajectory> {
        &self.table
    }

    /// 0 before the first pass, 0.5 while computing, 1 once up to date.
    pub fn completion(&self) -> f32 {
        self.completion.get()
    }

    pub fn is_running(&self) -> bool {
        self.state.load(Ordering::Acquire) != IDLE
    }

    /// Schedules a pass over the frames not yet in the table.
    pub fn request_update(&self) -> Result<(), EngineError> {
        loop {
            match self.state.load(Ordering::Acquire) {
                IDLE => {
                    if self
                        .state
                        .compare_exchange(IDLE, RUNNING, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        return self.spawn_pass();
                    }
                }
                RUNNING => {
                    if self
                        .state
                        .compare_exchange(
                            RUNNING,
                            RUNNING_WITH_QUERY,
                            Ordering::AcqRel,
                            Ordering::Acquire,
                        )
                        .is_ok()
                    {
                        debug!("Angle pass in progress; queued one more.");
                        return Ok(());
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// Stops the worker after its current pass and waits for it.
    pub fn stop(&self) -> Result<(), EngineError> {
        let handle = self.lock_handle().take();
        match handle {
            Some(handle) => handle.stop_and_join(),
            None => Ok(()),
        }
    }

    fn lock_handle(&self) -> std::sync::MutexGuard<'_, Option<TaskHandle<()>>> {
        self.handle.lock().unwrap_or_else(|poisoned| {
            warn!("Angle worker handle lock was poisoned; recovering.");
            poisoned.into_inner()
        })
    }

    fn spawn_pass(&self) -> Result<(), EngineError> {
        let mut slot = self.lock_handle();
        if let Some(previous) = slot.take() {
            // The previous thread already released the state; it is exiting.
            if let Err(e) = previous.join() {
                warn!(error = %e, "Previous backbone angle pass failed; starting a fresh one.");
            }
        }

        let structure = Arc::clone(&self.structure);
        let trajectory = Arc::clone(&self.trajectory);
        let table = Arc::clone(&self.table);
        let completion = self.completion.clone();
        let state = Arc::clone(&self.state);

        let spawned = TaskHandle::spawn("backbone-angles", move |token| {
            run_passes(&structure, &trajectory, &table, &completion, &state, &token);
        });
        match spawned {
            Ok(handle) => {
                *slot = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.state.store(IDLE, Ordering::Release);
                Err(e)
            }
        }
    }
}

impl Drop for AngleWorker {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!(error = %e, "Angle worker did not stop cleanly.");
        }
    }
}

#[instrument(skip_all, name = "backbone_angles_task")]
fn run_passes(
    structure: &MolecularStructure,
    trajectory: &Trajectory,
    table: &BackboneAnglesTrajectory,
    completion: &Completion,
    state: &AtomicU8,
    token: &CancellationToken,
) {
    let _guard = PanicReleaseGuard(state);
    loop {
        completion.set(0.5);
        let added = table.update(structure, trajectory);
        completion.set(1.0);
        debug!(added, total = table.num_frames(), "Backbone angle pass finished.");

        if token.is_cancelled() {
            state.store(IDLE, Ordering::Release);
            return;
        }
        // Exit only if nobody queued another pass in the meantime.
        if state
            .compare_exchange(RUNNING, IDLE, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            return;
        }
        state.store(RUNNING, Ordering::Release);
    }
}

/// Returns the worker to `IDLE` if a pass unwinds, so later requests can start
/// a new one.
struct PanicReleaseGuard<'a>(&'a AtomicU8);

impl Drop for PanicReleaseGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.store(IDLE, Ordering::Release);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Element;
    use crate::core::models::frame::TrajectoryFrame;
    use crate::core::models::simulation_box::SimulationBox;
    use crate::core::models::structure::StructureBuilder;
    use crate::core::topology::bonds::CovalentBondCriteria;
    use crate::workflows::topology::build_topology;
    use nalgebra::Point3;
    use std::time::{Duration, Instant};

    fn tripeptide() -> MolecularStructure {
        let mut builder = StructureBuilder::new();
        for r in 0..3 {
            let x = r as f32 * 3.6;
            builder
                .start_residue(r + 1, "ALA")
                .add_atom("N", Element::Nitrogen, Point3::new(x, 0.0, 0.0))
                .add_atom("CA", Element::Carbon, Point3::new(x + 1.2, 0.8, 0.0))
                .add_atom("C", Element::Carbon, Point3::new(x + 2.4, 0.0, 0.0))
                .add_atom("O", Element::Oxygen, Point3::new(x + 2.4, -1.2, 0.0));
        }
        let mut structure = builder.build().unwrap();
        build_topology(&mut structure, &CovalentBondCriteria::default());
        structure
    }

    fn wait_until(condition: impl Fn() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !condition() {
            assert!(Instant::now() < deadline, "timed out");
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn worker_catches_up_with_frames_published_between_requests() {
        let structure = Arc::new(tripeptide());
        assert!(structure.has_backbone());
        let trajectory = Arc::new(Trajectory::with_capacity(structure.atom_count(), 6));
        let table = Arc::new(BackboneAnglesTrajectory::for_structure(&structure, &trajectory));
        let worker = AngleWorker::new(Arc::clone(&structure), Arc::clone(&trajectory), Arc::clone(&table));
        assert_eq!(worker.completion(), 0.0);

        for _ in 0..6 {
            let frame = TrajectoryFrame::new(structure.positions().to_vec(), SimulationBox::default());
            trajectory.push_frame(frame).unwrap();
            worker.request_update().unwrap();
        }
        worker.request_update().unwrap();

        wait_until(|| !worker.is_running() && table.num_frames() == 6);
        assert_eq!(worker.completion(), 1.0);
        worker.stop().unwrap();
    }

    #[test]
    fn worker_recovers_after_a_pass_panics() {
        let structure = Arc::new(tripeptide());
        let trajectory = Arc::new(Trajectory::with_capacity(structure.atom_count(), 2));
        let frame = TrajectoryFrame::new(structure.positions().to_vec(), SimulationBox::default());
        trajectory.push_frame(frame).unwrap();
        // One segment short of the structure's backbone, so every pass panics.
        let table = Arc::new(BackboneAnglesTrajectory::new(
            structure.backbone_segments().len() - 1,
            trajectory.capacity(),
        ));
        let worker = AngleWorker::new(Arc::clone(&structure), Arc::clone(&trajectory), Arc::clone(&table));

        worker.request_update().unwrap();
        wait_until(|| !worker.is_running());

        worker.request_update().unwrap();
        wait_until(|| !worker.is_running());
        assert_eq!(table.num_frames(), 0);
        assert!(matches!(worker.stop(), Err(EngineError::TaskPanicked(_))));
    }

    #[test]
    fn stop_without_running_pass_is_a_no_op() {
        let structure = Arc::new(tripeptide());
        let trajectory = Arc::new(Trajectory::with_capacity(structure.atom_count(), 1));
        let table = Arc::new(BackboneAnglesTrajectory::for_structure(&structure, &trajectory));
        let worker = AngleWorker::new(structure, trajectory, table);
        worker.stop().unwrap();
        assert!(!worker.is_running());
    }
}
