use crate::core::models::chain::Chain;
use crate::core::models::residue::Residue;
use crate::core::models::topology::{BackboneSegment, BackboneSequence};
use crate::core::utils::identifiers::{is_amino_acid, label_matches};
use tracing::{debug, warn};

/// Locates N, CA, C and O in every amino-acid residue.
///
/// Labels are compared case-insensitively and the first match wins. When no atom
/// is labelled exactly "O", the first atom at or after C whose label starts with
/// 'O' is used instead (terminal "OT1"/"OXT" style carbonyls).
///
/// The result is index-aligned with `residues`. If no residue yields a complete
/// segment the whole table is empty, meaning the structure has no backbone.
pub fn compute_backbone_segments(
    residues: &[Residue],
    labels: &[String],
) -> Vec<Option<BackboneSegment>> {
    let segments: Vec<Option<BackboneSegment>> = residues
        .iter()
        .map(|res| {
            if !is_amino_acid(&res.name) {
                return None;
            }
            let segment = find_backbone_atoms(res, labels);
            if segment.is_none() {
                warn!(
                    residue = %res.name,
                    id = res.id,
                    "Could not identify all backbone atoms for residue"
                );
            }
            segment
        })
        .collect();

    let valid = segments.iter().flatten().count();
    debug!(
        residues = residues.len(),
        valid,
        invalid = residues.len() - valid,
        "Derived backbone segments"
    );
    if valid == 0 { Vec::new() } else { segments }
}

fn find_backbone_atoms(res: &Residue, labels: &[String]) -> Option<BackboneSegment> {
    let find = |name: &str| res.atom_range.clone().find(|&i| label_matches(&labels[i], name));

    let n_idx = find("N");
    let ca_idx = find("CA");
    let c_idx = find("C");
    let o_idx = find("O").or_else(|| {
        let c = c_idx?;
        (c..res.atom_range.end).find(|&i| {
            labels[i]
                .trim_start()
                .starts_with(|ch: char| ch.eq_ignore_ascii_case(&'o'))
        })
    });

    Some(BackboneSegment {
        n_idx: n_idx?,
        ca_idx: ca_idx?,
        c_idx: c_idx?,
        o_idx: o_idx?,
    })
}

/// Splits every chain into maximal runs of residues with valid segments.
///
/// Returns nothing when the backbone table is empty. Residues outside all
/// chains are not part of any sequence.
pub fn compute_backbone_sequences(
    segments: &[Option<BackboneSegment>],
    chains: &[Chain],
) -> Vec<BackboneSequence> {
    if segments.is_empty() {
        return Vec::new();
    }

    let mut sequences = Vec::new();
    for (chain_idx, chain) in chains.iter().enumerate() {
        let mut run_start = None;
        for res in chain.residue_range.clone() {
            match (segments[res].is_some(), run_start) {
                (true, None) => run_start = Some(res),
                (false, Some(beg)) => {
                    sequences.push(BackboneSequence {
                        chain: chain_idx,
                        residue_range: beg..res,
                    });
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(beg) = run_start {
            sequences.push(BackboneSequence {
                chain: chain_idx,
                residue_range: beg..chain.residue_range.end,
            });
        }
    }
    sequences
}
