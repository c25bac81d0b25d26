use super::{load_structure, load_trajectory, positions_at};
use crate::cli::SplineArgs;
use crate::config::{CommandOverrides, build_config};
use crate::error::{CliError, Result};
use moldyn::core::coloring::{compute_atom_colors, unpack_rgba};
use moldyn::engine::spline::{SplineSegment, compute_structure_splines};
use moldyn::workflows::topology::build_topology;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

#[derive(Serialize)]
struct SplineRecord {
    chain: usize,
    sample: usize,
    x: f32,
    y: f32,
    z: f32,
    tx: f32,
    ty: f32,
    tz: f32,
    nx: f32,
    ny: f32,
    nz: f32,
    bx: f32,
    by: f32,
    bz: f32,
    atom_index: usize,
    color: String,
}

impl SplineRecord {
    fn new(chain: usize, sample: usize, s: &SplineSegment) -> Self {
        let [r, g, b, a] = unpack_rgba(s.color);
        Self {
            chain,
            sample,
            x: s.position.x,
            y: s.position.y,
            z: s.position.z,
            tx: s.tangent.x,
            ty: s.tangent.y,
            tz: s.tangent.z,
            nx: s.normal.x,
            ny: s.normal.y,
            nz: s.normal.z,
            bx: s.binormal.x,
            by: s.binormal.y,
            bz: s.binormal.z,
            atom_index: s.atom_index,
            color: format!("#{r:02x}{g:02x}{b:02x}{a:02x}"),
        }
    }
}

pub fn run(args: SplineArgs) -> Result<()> {
    let config = build_config(
        &args.config,
        CommandOverrides {
            interpolation: args.mode,
            subdivisions: args.subdivisions,
            tension: args.tension,
            coloring: args.coloring,
        },
    )?;

    let mut structure = load_structure(&args.input)?;
    build_topology(&mut structure, &config.bonds);

    let positions = match (&args.trajectory, args.time) {
        (Some(path), Some(time)) => {
            let trajectory = load_trajectory(path, structure.atom_count())?;
            positions_at(&trajectory, time, config.playback.interpolation)?
        }
        _ => structure.positions().to_vec(),
    };

    let colors = compute_atom_colors(&structure, config.coloring);
    let runs = compute_structure_splines(&structure, &positions, &colors, &config.spline);
    if runs.is_empty() {
        warn!("No backbone sequence is long enough for a spline.");
    }
    info!(
        runs = runs.len(),
        subdivisions = config.spline.subdivisions,
        tension = config.spline.tension,
        "Computed backbone splines."
    );

    let samples = write_splines(&runs, &args.output)?;
    println!(
        "{} spline run(s) ({} samples) written to: {}",
        runs.len(),
        samples,
        args.output.display()
    );
    Ok(())
}

fn write_splines(runs: &[Vec<SplineSegment>], path: &Path) -> Result<usize> {
    let to_error = |e: csv::Error| CliError::FileWriting {
        path: path.to_path_buf(),
        source: e.into(),
    };
    let mut writer = csv::Writer::from_path(path).map_err(to_error)?;
    let mut samples = 0;
    for (chain, run) in runs.iter().enumerate() {
        for (sample, segment) in run.iter().enumerate() {
            writer
                .serialize(SplineRecord::new(chain, sample, segment))
                .map_err(to_error)?;
            samples += 1;
        }
    }
    writer.flush()?;
    Ok(samples)
}
