use super::{load_structure, load_trajectory, positions_at};
use crate::cli::InterpolateArgs;
use crate::config::{CommandOverrides, build_config};
use crate::error::{CliError, Result};
use moldyn::core::io::csv::CsvAtomFile;
use moldyn::core::io::traits::MolecularFile;
use tracing::info;

pub fn run(args: InterpolateArgs) -> Result<()> {
    let config = build_config(
        &args.config,
        CommandOverrides {
            interpolation: args.mode,
            ..Default::default()
        },
    )?;
    let mode = config.playback.interpolation;

    let mut structure = load_structure(&args.input)?;
    let trajectory = load_trajectory(&args.trajectory, structure.atom_count())?;

    info!(time = args.time, %mode, "Interpolating positions.");
    let positions = positions_at(&trajectory, args.time, mode)?;
    structure.positions_mut().copy_from_slice(&positions);

    CsvAtomFile::write_to_path(&structure, &args.output).map_err(|e| CliError::FileWriting {
        path: args.output.clone(),
        source: e.into(),
    })?;
    println!(
        "Positions at t = {} ({}) written to: {}",
        args.time,
        mode,
        args.output.display()
    );
    Ok(())
}
