use super::load_structure;
use crate::cli::TopologyArgs;
use crate::config::{CommandOverrides, build_config};
use crate::error::{CliError, Result};
use moldyn::core::coloring::compute_atom_radii;
use moldyn::core::models::structure::MolecularStructure;
use moldyn::core::utils::geometry::{compute_bounding_box, compute_com};
use moldyn::workflows::topology::{TopologySummary, build_topology};
use serde::Serialize;
use std::path::Path;
use tracing::info;

#[derive(Serialize)]
struct BondRecord {
    atom_a: usize,
    atom_b: usize,
}

pub fn run(args: TopologyArgs) -> Result<()> {
    let config = build_config(&args.config, CommandOverrides::default())?;
    let mut structure = load_structure(&args.input)?;

    let summary = build_topology(&mut structure, &config.bonds);
    print_summary(&structure, &summary);

    if let Some(path) = &args.bonds_out {
        write_bonds(&structure, path)?;
        println!("Bonds written to: {}", path.display());
    }
    Ok(())
}

fn print_summary(structure: &MolecularStructure, summary: &TopologySummary) {
    println!("Atoms:              {}", structure.atom_count());
    println!("Residues:           {}", structure.residues().len());
    println!("Bonds:              {}", summary.bonds);
    println!("Chains:             {}", summary.chains);
    println!(
        "Backbone segments:  {} valid in {} sequence(s)",
        summary.valid_segments, summary.sequences
    );

    let masses: Vec<f32> = structure.elements().iter().map(|e| e.atomic_mass()).collect();
    let com = compute_com(structure.positions(), Some(&masses));
    println!("Centre of mass:     ({:.3}, {:.3}, {:.3})", com.x, com.y, com.z);

    let radii = compute_atom_radii(structure.elements());
    match compute_bounding_box(structure.positions(), Some(&radii)) {
        Some(bbox) => {
            let extent = bbox.extent();
            println!(
                "Bounding box:       ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3}), extent ({:.3}, {:.3}, {:.3})",
                bbox.min.x, bbox.min.y, bbox.min.z, bbox.max.x, bbox.max.y, bbox.max.z,
                extent.x, extent.y, extent.z
            );
        }
        None => println!("Bounding box:       (empty structure)"),
    }
}

fn write_bonds(structure: &MolecularStructure, path: &Path) -> Result<()> {
    info!(bonds = structure.bonds().len(), "Writing bonds to {:?}", path);
    let to_error = |e: csv::Error| CliError::FileWriting {
        path: path.to_path_buf(),
        source: e.into(),
    };
    let mut writer = csv::Writer::from_path(path).map_err(to_error)?;
    for bond in structure.bonds() {
        writer
            .serialize(BondRecord {
                atom_a: bond.atom_a,
                atom_b: bond.atom_b,
            })
            .map_err(to_error)?;
    }
    writer.flush()?;
    Ok(())
}
