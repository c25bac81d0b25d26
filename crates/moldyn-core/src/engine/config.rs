use crate::core::coloring::ColorMapping;
use crate::core::topology::bonds::CovalentBondCriteria;
use crate::engine::interpolation::InterpolationMode;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for '{name}': {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplineConfig {
    pub subdivisions: usize,
    pub tension: f32,
}

impl Default for SplineConfig {
    fn default() -> Self {
        Self {
            subdivisions: 8,
            tension: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackConfig {
    pub frames_per_second: f64,
    pub interpolation: InterpolationMode,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            frames_per_second: 10.0,
            interpolation: InterpolationMode::CubicPeriodic,
        }
    }
}

/// Tunable parameters of an analysis session.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnalysisConfig {
    pub bonds: CovalentBondCriteria,
    pub spline: SplineConfig,
    pub playback: PlaybackConfig,
    pub coloring: ColorMapping,
}

impl AnalysisConfig {
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::new()
    }
}

/// Builder for [`AnalysisConfig`]; unset fields take their defaults.
#[derive(Default)]
pub struct AnalysisConfigBuilder {
    search_radius: Option<f32>,
    upper_tolerance: Option<f32>,
    lower_tolerance: Option<f32>,
    subdivisions: Option<usize>,
    tension: Option<f32>,
    interpolation: Option<InterpolationMode>,
    frames_per_second: Option<f64>,
    coloring: Option<ColorMapping>,
}

impl AnalysisConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_radius(mut self, radius: f32) -> Self {
        self.search_radius = Some(radius);
        self
    }
    pub fn upper_tolerance(mut self, tolerance: f32) -> Self {
        self.upper_tolerance = Some(tolerance);
        self
    }
    pub fn lower_tolerance(mut self, tolerance: f32) -> Self {
        self.lower_tolerance = Some(tolerance);
        self
    }
    pub fn subdivisions(mut self, n: usize) -> Self {
        self.subdivisions = Some(n);
        self
    }
    pub fn tension(mut self, tension: f32) -> Self {
        self.tension = Some(tension);
        self
    }
    pub fn interpolation(mut self, mode: InterpolationMode) -> Self {
        self.interpolation = Some(mode);
        self
    }
    pub fn frames_per_second(mut self, fps: f64) -> Self {
        self.frames_per_second = Some(fps);
        self
    }
    pub fn coloring(mut self, mapping: ColorMapping) -> Self {
        self.coloring = Some(mapping);
        self
    }

    pub fn build(self) -> Result<AnalysisConfig, ConfigError> {
        let defaults = AnalysisConfig::default();

        let bonds = CovalentBondCriteria {
            search_radius: positive(
                "search_radius",
                self.search_radius.unwrap_or(defaults.bonds.search_radius),
            )?,
            upper_tolerance: positive(
                "upper_tolerance",
                self.upper_tolerance.unwrap_or(defaults.bonds.upper_tolerance),
            )?,
            lower_tolerance: positive(
                "lower_tolerance",
                self.lower_tolerance.unwrap_or(defaults.bonds.lower_tolerance),
            )?,
        };

        let subdivisions = self.subdivisions.unwrap_or(defaults.spline.subdivisions);
        if subdivisions == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "subdivisions",
                value: subdivisions.to_string(),
                reason: "must be at least 1",
            });
        }
        let tension = self.tension.unwrap_or(defaults.spline.tension);
        if !(0.0..=1.0).contains(&tension) {
            return Err(ConfigError::InvalidParameter {
                name: "tension",
                value: tension.to_string(),
                reason: "must lie in [0, 1]",
            });
        }

        let frames_per_second = self
            .frames_per_second
            .unwrap_or(defaults.playback.frames_per_second);
        if !(frames_per_second > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "frames_per_second",
                value: frames_per_second.to_string(),
                reason: "must be positive",
            });
        }

        Ok(AnalysisConfig {
            bonds,
            spline: SplineConfig {
                subdivisions,
                tension,
            },
            playback: PlaybackConfig {
                frames_per_second,
                interpolation: self.interpolation.unwrap_or(defaults.playback.interpolation),
            },
            coloring: self.coloring.unwrap_or(defaults.coloring),
        })
    }
}

fn positive(name: &'static str, value: f32) -> Result<f32, ConfigError> {
    if value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            value: value.to_string(),
            reason: "must be positive",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_without_overrides_yields_defaults() {
        let config = AnalysisConfig::builder().build().unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.bonds.search_radius, 3.5);
        assert_eq!(config.spline.subdivisions, 8);
        assert_eq!(config.playback.interpolation, InterpolationMode::CubicPeriodic);
        assert_eq!(config.coloring, ColorMapping::Cpk);
    }

    #[test]
    fn builder_applies_overrides() {
        let config = AnalysisConfig::builder()
            .subdivisions(4)
            .tension(0.25)
            .interpolation(InterpolationMode::Linear)
            .frames_per_second(30.0)
            .build()
            .unwrap();
        assert_eq!(config.spline.subdivisions, 4);
        assert_eq!(config.spline.tension, 0.25);
        assert_eq!(config.playback.interpolation, InterpolationMode::Linear);
        assert_eq!(config.playback.frames_per_second, 30.0);
    }

    #[test]
    fn builder_rejects_non_positive_search_radius() {
        let err = AnalysisConfig::builder().search_radius(0.0).build().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidParameter {
                name: "search_radius",
                ..
            }
        ));
    }

    #[test]
    fn builder_rejects_zero_subdivisions_and_out_of_range_tension() {
        assert!(AnalysisConfig::builder().subdivisions(0).build().is_err());
        assert!(AnalysisConfig::builder().tension(1.5).build().is_err());
        assert!(AnalysisConfig::builder().frames_per_second(f64::NAN).build().is_err());
    }
}
