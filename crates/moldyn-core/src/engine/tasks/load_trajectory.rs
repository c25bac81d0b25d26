use crate::core::io::traits::FrameSource;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::trajectory::Trajectory;
use crate::engine::worker::{CancellationToken, Completion, TaskHandle};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// How a loader run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Completed { frames: usize },
    Cancelled { frames: usize },
    Failed { frames: usize },
}

impl LoadOutcome {
    pub fn frames(&self) -> usize {
        match *self {
            Self::Completed { frames } | Self::Cancelled { frames } | Self::Failed { frames } => {
                frames
            }
        }
    }
}

/// Streams every frame of `source` into `trajectory` on a background thread.
///
/// After each frame the completion fraction becomes
/// `num_frames / expected_frames`. When the source is exhausted `on_finish` runs
/// on the loader thread (typically to request an angle update). A read error
/// stops the loader, is logged, and leaves the fraction where it was.
pub fn spawn_trajectory_loader<F>(
    source: Box<dyn FrameSource>,
    trajectory: Arc<Trajectory>,
    completion: Completion,
    reporter: ProgressReporter<'static>,
    on_finish: F,
) -> Result<TaskHandle<LoadOutcome>, EngineError>
where
    F: FnOnce() + Send + 'static,
{
    completion.set(0.0);
    TaskHandle::spawn("trajectory-loader", move |token| {
        let outcome = load_frames(source, &trajectory, &completion, &reporter, &token);
        if let LoadOutcome::Completed { .. } = outcome {
            on_finish();
        }
        outcome
    })
}

#[instrument(skip_all, name = "trajectory_loader_task")]
fn load_frames(
    mut source: Box<dyn FrameSource>,
    trajectory: &Trajectory,
    completion: &Completion,
    reporter: &ProgressReporter,
    token: &CancellationToken,
) -> LoadOutcome {
    let expected = source
        .expected_frames()
        .unwrap_or(trajectory.capacity())
        .max(1);
    info!(expected_frames = expected, "Streaming trajectory frames.");
    reporter.report(Progress::TaskStart {
        total_steps: expected as u64,
    });

    let outcome = loop {
        let frames = trajectory.num_frames();
        if token.is_cancelled() {
            break LoadOutcome::Cancelled { frames };
        }
        match source.read_next_frame() {
            Ok(Some(frame)) => {
                if let Err(e) = trajectory.push_frame(frame) {
                    error!(error = %e, "Failed to store trajectory frame.");
                    break LoadOutcome::Failed { frames };
                }
                completion.set(trajectory.num_frames() as f32 / expected as f32);
                reporter.report(Progress::TaskIncrement);
            }
            Ok(None) => {
                completion.set(1.0);
                break LoadOutcome::Completed { frames };
            }
            Err(e) => {
                error!(error = %e, frame = frames, "Failed to read trajectory frame.");
                break LoadOutcome::Failed { frames };
            }
        }
    };

    reporter.report(Progress::TaskFinish);
    info!(?outcome, "Trajectory loader finished.");
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::memory::MemoryFrameSource;
    use crate::core::io::traits::FrameSourceError;
    use crate::core::models::frame::TrajectoryFrame;
    use crate::core::models::simulation_box::SimulationBox;
    use nalgebra::Point3;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn frames(n: usize) -> Vec<TrajectoryFrame> {
        (0..n)
            .map(|i| TrajectoryFrame::new(vec![Point3::new(i as f32, 0.0, 0.0)], SimulationBox::default()))
            .collect()
    }

    #[test]
    fn loader_streams_all_frames_and_calls_on_finish() {
        let trajectory = Arc::new(Trajectory::with_capacity(1, 5));
        let completion = Completion::new();
        let finished = Arc::new(AtomicBool::new(false));

        let handle = {
            let finished = Arc::clone(&finished);
            spawn_trajectory_loader(
                Box::new(MemoryFrameSource::new(frames(5))),
                Arc::clone(&trajectory),
                completion.clone(),
                ProgressReporter::new(),
                move || finished.store(true, Ordering::SeqCst),
            )
            .unwrap()
        };

        assert_eq!(handle.join().unwrap(), LoadOutcome::Completed { frames: 5 });
        assert_eq!(trajectory.num_frames(), 5);
        assert!(completion.is_done());
        assert!(finished.load(Ordering::SeqCst));
    }

    struct FailingSource {
        served: usize,
    }

    impl FrameSource for FailingSource {
        fn atom_count(&self) -> usize {
            1
        }
        fn expected_frames(&self) -> Option<usize> {
            Some(4)
        }
        fn read_next_frame(&mut self) -> Result<Option<TrajectoryFrame>, FrameSourceError> {
            if self.served == 2 {
                return Err(FrameSourceError::AtomCountMismatch {
                    frame: 2,
                    expected: 1,
                    found: 0,
                });
            }
            self.served += 1;
            Ok(Some(TrajectoryFrame::new(vec![Point3::origin()], SimulationBox::default())))
        }
    }

    #[test]
    fn read_error_stops_loader_and_leaves_completion_static() {
        let trajectory = Arc::new(Trajectory::with_capacity(1, 4));
        let completion = Completion::new();
        let handle = spawn_trajectory_loader(
            Box::new(FailingSource { served: 0 }),
            Arc::clone(&trajectory),
            completion.clone(),
            ProgressReporter::new(),
            || panic!("on_finish must not run after a failure"),
        )
        .unwrap();

        assert_eq!(handle.join().unwrap(), LoadOutcome::Failed { frames: 2 });
        assert_eq!(trajectory.num_frames(), 2);
        assert_eq!(completion.get(), 0.5);
    }
}
