use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use crate::cli::ConfigArgs;
use crate::error::{CliError, Result};
use moldyn::core::coloring::ColorMapping;
use moldyn::engine::config::AnalysisConfig;
use moldyn::engine::interpolation::InterpolationMode;
use std::str::FromStr;

/// Settings that individual subcommands expose as their own flags.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandOverrides {
    pub interpolation: Option<InterpolationMode>,
    pub subdivisions: Option<usize>,
    pub tension: Option<f32>,
    pub coloring: Option<ColorMapping>,
}

/// Resolves the analysis configuration.
///
/// Each key is taken from the first source that sets it: command flag,
/// `--set KEY=VALUE`, config file, built-in default.
pub fn build_config(args: &ConfigArgs, overrides: CommandOverrides) -> Result<AnalysisConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = match &args.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    let file_config = apply_set_values(file_config, &args.set_values)?;

    let bonds = file_config.bonds.unwrap_or_default();
    let spline = file_config.spline.unwrap_or_default();
    let playback = file_config.playback.unwrap_or_default();

    let coloring = match (overrides.coloring, file_config.coloring) {
        (Some(mapping), _) => mapping,
        (None, Some(name)) => parse_value("coloring", &name)?,
        (None, None) => defaults.coloring,
    };

    AnalysisConfig::builder()
        .search_radius(
            args.search_radius
                .or(bonds.search_radius)
                .unwrap_or(defaults.search_radius),
        )
        .upper_tolerance(bonds.upper_tolerance.unwrap_or(defaults.upper_tolerance))
        .lower_tolerance(bonds.lower_tolerance.unwrap_or(defaults.lower_tolerance))
        .subdivisions(
            overrides
                .subdivisions
                .or(spline.subdivisions)
                .unwrap_or(defaults.subdivisions),
        )
        .tension(
            overrides
                .tension
                .or(spline.tension)
                .unwrap_or(defaults.tension),
        )
        .interpolation(
            overrides
                .interpolation
                .or(playback.interpolation)
                .unwrap_or(defaults.interpolation),
        )
        .frames_per_second(
            playback
                .frames_per_second
                .unwrap_or(defaults.frames_per_second),
        )
        .coloring(coloring)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        CliError::Config(format!("Invalid value for {}: '{}'", key, value))
    })
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };
        let key = key.trim();

        match key {
            "bonds.search-radius" => {
                config.bonds.get_or_insert_with(Default::default).search_radius =
                    Some(parse_value(key, value)?);
            }
            "bonds.upper-tolerance" => {
                config.bonds.get_or_insert_with(Default::default).upper_tolerance =
                    Some(parse_value(key, value)?);
            }
            "bonds.lower-tolerance" => {
                config.bonds.get_or_insert_with(Default::default).lower_tolerance =
                    Some(parse_value(key, value)?);
            }
            "spline.subdivisions" => {
                config.spline.get_or_insert_with(Default::default).subdivisions =
                    Some(parse_value(key, value)?);
            }
            "spline.tension" => {
                config.spline.get_or_insert_with(Default::default).tension =
                    Some(parse_value(key, value)?);
            }
            "playback.interpolation" => {
                config.playback.get_or_insert_with(Default::default).interpolation =
                    Some(parse_value(key, value)?);
            }
            "playback.frames-per-second" => {
                config
                    .playback
                    .get_or_insert_with(Default::default)
                    .frames_per_second = Some(parse_value(key, value)?);
            }
            "coloring" => {
                let mapping: ColorMapping = parse_value(key, value)?;
                config.coloring = Some(mapping.to_string());
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
