use crate::engine::config::PlaybackConfig;
use crate::engine::error::EngineError;
use crate::engine::interpolation::{InterpolationMode, interpolate_positions};
use crate::engine::trajectory::Trajectory;
use nalgebra::Point3;

/// Playback clock of one session.
///
/// Time is measured in frames and kept in double precision so that long
/// trajectories do not drift; only the final blend fraction is narrowed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackState {
    pub time: f64,
    pub frames_per_second: f64,
    pub is_playing: bool,
    pub interpolation: InterpolationMode,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new(&PlaybackConfig::default())
    }
}

impl PlaybackState {
    pub fn new(config: &PlaybackConfig) -> Self {
        Self {
            time: 0.0,
            frames_per_second: config.frames_per_second,
            is_playing: false,
            interpolation: config.interpolation,
        }
    }

    pub fn play(&mut self) {
        self.is_playing = true;
    }

    pub fn pause(&mut self) {
        self.is_playing = false;
    }

    /// Moves the clock `dt` seconds forward when playing and clamps it to the
    /// loaded frames. Playback stops on reaching the last frame.
    pub fn advance(&mut self, dt: f64, num_frames: usize) {
        if self.is_playing {
            self.time += dt * self.frames_per_second;
        }
        let last = num_frames.saturating_sub(1) as f64;
        if self.time >= last {
            self.time = last;
            self.is_playing = false;
        }
        self.time = self.time.max(0.0);
    }

    /// Scrubs to `time`; clamping happens on the next update.
    pub fn seek(&mut self, time: f64) {
        self.time = time;
    }

    pub fn frame(&self) -> usize {
        self.time.max(0.0) as usize
    }

    pub fn fraction(&self) -> f64 {
        self.time.max(0.0).fract()
    }

    /// Writes the positions at the current time into `dst`.
    pub fn update_positions(
        &self,
        dst: &mut [Point3<f32>],
        trajectory: &Trajectory,
    ) -> Result<(), EngineError> {
        interpolate_positions(dst, trajectory, self.time, self.interpolation)
    }
}
