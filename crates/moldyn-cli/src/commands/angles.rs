use super::{load_structure, open_trajectory};
use crate::cli::AnglesArgs;
use crate::config::{CommandOverrides, build_config};
use crate::error::{CliError, Result};
use crate::utils::progress::LoadProgress;
use moldyn::engine::progress::ProgressReporter;
use moldyn::engine::tasks::load_trajectory::LoadOutcome;
use moldyn::workflows::dynamics::DynamicsSession;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Serialize)]
struct AngleRecord {
    frame: usize,
    residue: isize,
    omega: f32,
    phi: f32,
    psi: f32,
}

pub fn run(args: AnglesArgs) -> Result<()> {
    let config = build_config(&args.config, CommandOverrides::default())?;
    let structure = load_structure(&args.input)?;
    let source = open_trajectory(&args.trajectory, structure.atom_count())?;

    let mut session = DynamicsSession::open(
        structure,
        Box::new(source),
        config,
        ProgressReporter::new(),
    )?;
    let progress = LoadProgress::new(session.trajectory().capacity(), true);
    progress.follow_session(&mut session)?;

    match session.wait_for_loader()? {
        Some(LoadOutcome::Completed { frames }) => info!(frames, "Trajectory loaded."),
        Some(outcome) => {
            progress.finish();
            return Err(CliError::TrajectoryIncomplete {
                path: args.trajectory.clone(),
                frames: outcome.frames(),
            });
        }
        None => {}
    }
    session.wait_for_angles()?;
    progress.track_session(&session);
    progress.finish();

    if !session.structure().has_backbone() {
        warn!("Structure has no valid backbone; the angle table will be empty.");
    }
    let frames = session.angle_table().num_frames();
    let rows = write_angles(&session, &args.output)?;
    session.shutdown()?;

    println!(
        "Backbone angles for {} frame(s) ({} rows) written to: {}",
        frames,
        rows,
        args.output.display()
    );
    Ok(())
}

fn write_angles(session: &DynamicsSession, path: &std::path::Path) -> Result<usize> {
    let to_error = |e: csv::Error| CliError::FileWriting {
        path: path.to_path_buf(),
        source: e.into(),
    };
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(to_error)?;
    writer
        .write_record(["frame", "residue", "omega", "phi", "psi"])
        .map_err(to_error)?;

    let structure = session.structure();
    let table = session.angle_table();
    let mut rows = 0;
    for frame in 0..table.num_frames() {
        let Some(angles) = table.frame(frame) else {
            break;
        };
        for sequence in structure.backbone_sequences() {
            for r in sequence.residue_range.clone() {
                let a = angles[r];
                writer
                    .serialize(AngleRecord {
                        frame,
                        residue: structure.residues()[r].id,
                        omega: a.omega.to_degrees(),
                        phi: a.phi.to_degrees(),
                        psi: a.psi.to_degrees(),
                    })
                    .map_err(to_error)?;
                rows += 1;
            }
        }
    }
    writer.flush()?;
    Ok(rows)
}
