use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use moldyn::engine::error::EngineError;
use moldyn::engine::trajectory::Trajectory;
use moldyn::engine::worker::TaskHandle;
use moldyn::workflows::dynamics::DynamicsSession;
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

const TEMPLATE: &str = "{prefix:>8} [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// Stacked stderr bars that follow the background workers by polling their
/// published counters: one for frames streamed in, optionally one for frames
/// covered by the backbone angle table.
pub struct LoadProgress {
    _multi: MultiProgress,
    frames: ProgressBar,
    angles: Option<ProgressBar>,
}

impl LoadProgress {
    pub fn new(expected_frames: usize, with_angles: bool) -> Self {
        Self::with_draw_target(expected_frames, with_angles, ProgressDrawTarget::stderr())
    }

    fn with_draw_target(expected_frames: usize, with_angles: bool, target: ProgressDrawTarget) -> Self {
        let multi = MultiProgress::with_draw_target(target);
        let bar = |prefix: &'static str| {
            multi.add(
                ProgressBar::new(expected_frames as u64)
                    .with_style(style())
                    .with_prefix(prefix),
            )
        };
        let frames = bar("frames");
        let angles = with_angles.then(|| bar("angles"));
        Self {
            _multi: multi,
            frames,
            angles,
        }
    }

    /// Polls until the loader thread exits, tracking published frames.
    pub fn follow_loader<T: Send + 'static>(&self, loader: &TaskHandle<T>, trajectory: &Trajectory) {
        while loader.is_running() {
            self.frames.set_position(trajectory.num_frames() as u64);
            thread::sleep(POLL_INTERVAL);
        }
        self.frames.set_position(trajectory.num_frames() as u64);
    }

    /// Drives `session` until the loader exits, keeping both bars current.
    ///
    /// Each poll advances the session by the elapsed wall time, which lets it
    /// schedule angle passes while frames are still arriving.
    pub fn follow_session(&self, session: &mut DynamicsSession) -> Result<(), EngineError> {
        let mut last = Instant::now();
        while session.is_loading() {
            let now = Instant::now();
            session.update((now - last).as_secs_f64())?;
            last = now;
            self.track_session(session);
            thread::sleep(POLL_INTERVAL);
        }
        self.track_session(session);
        Ok(())
    }

    pub fn track_session(&self, session: &DynamicsSession) {
        self.frames.set_position(session.trajectory().num_frames() as u64);
        self.frames
            .set_message(format!("{:.0}%", session.loader_completion() * 100.0));
        if let Some(angles) = &self.angles {
            angles.set_position(session.angle_table().num_frames() as u64);
            angles.set_message(if session.is_computing_angles() {
                "computing"
            } else if session.angle_completion() >= 1.0 {
                "up to date"
            } else {
                "waiting"
            });
        }
    }

    pub fn finish(&self) {
        self.frames.finish();
        if let Some(angles) = &self.angles {
            angles.finish();
        }
    }
}

fn style() -> ProgressStyle {
    ProgressStyle::with_template(TEMPLATE)
        .expect("progress template is valid")
        .progress_chars("##-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use moldyn::core::io::memory::MemoryFrameSource;
    use moldyn::core::models::atom::Element;
    use moldyn::core::models::frame::TrajectoryFrame;
    use moldyn::core::models::simulation_box::SimulationBox;
    use moldyn::core::models::structure::{MolecularStructure, StructureBuilder};
    use moldyn::engine::config::AnalysisConfig;
    use moldyn::engine::progress::ProgressReporter;
    use moldyn::engine::tasks::load_trajectory::spawn_trajectory_loader;
    use moldyn::engine::worker::Completion;
    use nalgebra::Point3;
    use std::sync::Arc;

    fn dipeptide() -> MolecularStructure {
        let mut builder = StructureBuilder::new();
        for r in 0..2 {
            let x = r as f32 * 3.6;
            builder
                .start_residue(r + 1, "GLY")
                .add_atom("N", Element::Nitrogen, Point3::new(x, 0.0, 0.0))
                .add_atom("CA", Element::Carbon, Point3::new(x + 1.2, 0.8, 0.0))
                .add_atom("C", Element::Carbon, Point3::new(x + 2.4, 0.0, 0.0))
                .add_atom("O", Element::Oxygen, Point3::new(x + 2.4, -1.2, 0.0));
        }
        builder.build().unwrap()
    }

    fn copies(structure: &MolecularStructure, n: usize) -> Vec<TrajectoryFrame> {
        (0..n)
            .map(|_| TrajectoryFrame::new(structure.positions().to_vec(), SimulationBox::default()))
            .collect()
    }

    #[test]
    fn frames_bar_follows_loader_to_the_end() {
        let structure = dipeptide();
        let trajectory = Arc::new(Trajectory::with_capacity(structure.atom_count(), 5));
        let progress = LoadProgress::with_draw_target(5, false, ProgressDrawTarget::hidden());
        assert!(progress.angles.is_none());

        let loader = spawn_trajectory_loader(
            Box::new(MemoryFrameSource::new(copies(&structure, 5))),
            Arc::clone(&trajectory),
            Completion::new(),
            ProgressReporter::new(),
            || {},
        )
        .unwrap();
        progress.follow_loader(&loader, &trajectory);
        loader.join().unwrap();
        progress.finish();

        assert_eq!(progress.frames.length(), Some(5));
        assert_eq!(progress.frames.position(), 5);
        assert!(progress.frames.is_finished());
    }

    #[test]
    fn session_bars_report_frames_and_angle_rows() {
        let structure = dipeptide();
        let frames = copies(&structure, 3);
        let mut session = DynamicsSession::open(
            structure,
            Box::new(MemoryFrameSource::new(frames)),
            AnalysisConfig::default(),
            ProgressReporter::new(),
        )
        .unwrap();
        let progress = LoadProgress::with_draw_target(3, true, ProgressDrawTarget::hidden());

        progress.follow_session(&mut session).unwrap();
        session.wait_for_angles().unwrap();
        progress.track_session(&session);

        let angles = progress.angles.as_ref().unwrap();
        assert_eq!(progress.frames.position(), 3);
        assert_eq!(progress.frames.message(), "100%");
        assert_eq!(angles.position(), 3);
        session.shutdown().unwrap();
    }
}
