use moldyn::core::coloring::ColorMapping;
use moldyn::engine::config::AnalysisConfig;
use moldyn::engine::interpolation::InterpolationMode;

/// Values used when neither a flag, a `--set` pair nor the config file names a key.
pub struct DefaultsConfig {
    pub search_radius: f32,
    pub upper_tolerance: f32,
    pub lower_tolerance: f32,
    pub subdivisions: usize,
    pub tension: f32,
    pub interpolation: InterpolationMode,
    pub frames_per_second: f64,
    pub coloring: ColorMapping,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        let core = AnalysisConfig::default();
        Self {
            search_radius: core.bonds.search_radius,
            upper_tolerance: core.bonds.upper_tolerance,
            lower_tolerance: core.bonds.lower_tolerance,
            subdivisions: core.spline.subdivisions,
            tension: core.spline.tension,
            interpolation: core.playback.interpolation,
            frames_per_second: core.playback.frames_per_second,
            coloring: core.coloring,
        }
    }
}
