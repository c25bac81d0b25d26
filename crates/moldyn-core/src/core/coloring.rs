//! Per-atom attributes derived from the structure: colours and radii.
//!
//! Colours are packed as RGBA8 in a `u32` with red in the lowest byte, which is
//! the layout a renderer can upload directly as `GL_UNSIGNED_BYTE` x 4.

use super::models::atom::Element;
use super::models::structure::MolecularStructure;
use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const HCL_GAMMA: f32 = 3.0;
const HCL_Y0: f32 = 100.0;
const HCL_MAX_L: f32 = 0.530_454_5;

const RESIDUE_HUE_BUCKETS: u32 = 21;
const CATEGORY_CHROMA: f32 = 0.45;
const CATEGORY_LUMINANCE: f32 = 0.90;
const UNASSIGNED_COLOR: u32 = pack_rgba(255, 255, 255, 255);

pub const fn pack_rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (r as u32) | (g as u32) << 8 | (b as u32) << 16 | (a as u32) << 24
}

/// Opaque colour from a `0xRRGGBB` literal.
pub const fn rgb(hex: u32) -> u32 {
    pack_rgba((hex >> 16) as u8, (hex >> 8) as u8, hex as u8, 255)
}

pub fn unpack_rgba(color: u32) -> [u8; 4] {
    color.to_le_bytes()
}

/// How atoms are coloured for display and for the spline builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMapping {
    Static(u32),
    #[default]
    Cpk,
    ResidueName,
    ResidueIndex,
    ChainIndex,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid color mapping '{0}' (expected cpk, residue-name, residue-index, chain-index or #RRGGBB)")]
pub struct ParseColorMappingError(String);

impl FromStr for ColorMapping {
    type Err = ParseColorMappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        match normalized.as_str() {
            "cpk" => Ok(Self::Cpk),
            "residue-name" | "res-id" => Ok(Self::ResidueName),
            "residue-index" | "res-index" => Ok(Self::ResidueIndex),
            "chain-index" | "chain" => Ok(Self::ChainIndex),
            hex if hex.starts_with('#') && hex.len() == 7 => u32::from_str_radix(&hex[1..], 16)
                .map(|v| Self::Static(rgb(v)))
                .map_err(|_| ParseColorMappingError(s.to_string())),
            _ => Err(ParseColorMappingError(s.to_string())),
        }
    }
}

impl fmt::Display for ColorMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(color) => {
                let [r, g, b, _] = unpack_rgba(*color);
                write!(f, "#{r:02x}{g:02x}{b:02x}")
            }
            Self::Cpk => f.write_str("cpk"),
            Self::ResidueName => f.write_str("residue-name"),
            Self::ResidueIndex => f.write_str("residue-index"),
            Self::ChainIndex => f.write_str("chain-index"),
        }
    }
}

/// Converts hue/chroma/luminance (all in [0, 1]) to an opaque packed colour.
pub fn hcl_to_rgb(hue: f32, chroma: f32, luminance: f32) -> u32 {
    if luminance == 0.0 {
        return pack_rgba(0, 0, 0, 255);
    }
    let l = luminance * HCL_MAX_L;
    let q = ((1.0 - chroma / (2.0 * l)) * (HCL_GAMMA / HCL_Y0)).exp();
    let u = (2.0 * l - chroma) / (2.0 * q - 1.0);
    let v = chroma / q;
    let t = ((hue + (fract(2.0 * hue) / 4.0).min(fract(-2.0 * hue) / 8.0)) * PI * 2.0).tan();

    let h = hue * 6.0;
    let (r, g, b) = if h <= 1.0 {
        (1.0, t / (1.0 + t), 0.0)
    } else if h <= 2.0 {
        ((1.0 + t) / t, 1.0, 0.0)
    } else if h <= 3.0 {
        (0.0, 1.0, 1.0 + t)
    } else if h <= 4.0 {
        (0.0, 1.0 / (1.0 + t), 1.0)
    } else if h <= 5.0 {
        (-1.0 / t, 0.0, 1.0)
    } else {
        (1.0, 0.0, -t)
    };

    let channel = |c: f32| ((c * v + u).clamp(0.0, 1.0) * 255.0).round() as u8;
    pack_rgba(channel(r), channel(g), channel(b), 255)
}

fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// FNV-1a; only needs to be stable across runs so a residue name keeps its colour.
fn name_hash(name: &str) -> u32 {
    name.trim().bytes().fold(0x811c_9dc5u32, |hash, byte| {
        (hash ^ byte as u32).wrapping_mul(0x0100_0193)
    })
}

fn category_color(index: usize, count: usize) -> u32 {
    let hue = index as f32 / count.max(1) as f32;
    hcl_to_rgb(hue, CATEGORY_CHROMA, CATEGORY_LUMINANCE)
}

pub fn compute_atom_colors(structure: &MolecularStructure, mapping: ColorMapping) -> Vec<u32> {
    let residues = structure.residues();
    let residue_of = structure.residue_indices();
    match mapping {
        ColorMapping::Static(color) => vec![color; structure.atom_count()],
        ColorMapping::Cpk => structure.elements().iter().map(Element::cpk_color).collect(),
        ColorMapping::ResidueName => residue_of
            .iter()
            .map(|res| match res {
                Some(r) => {
                    let bucket = name_hash(&residues[*r].name) % RESIDUE_HUE_BUCKETS;
                    hcl_to_rgb(
                        bucket as f32 / RESIDUE_HUE_BUCKETS as f32,
                        CATEGORY_CHROMA,
                        CATEGORY_LUMINANCE,
                    )
                }
                None => UNASSIGNED_COLOR,
            })
            .collect(),
        ColorMapping::ResidueIndex => residue_of
            .iter()
            .map(|res| res.map_or(UNASSIGNED_COLOR, |r| category_color(r, residues.len())))
            .collect(),
        ColorMapping::ChainIndex => {
            let chain_count = structure.chains().len();
            residue_of
                .iter()
                .map(|res| {
                    res.and_then(|r| residues[r].chain)
                        .map_or(UNASSIGNED_COLOR, |c| category_color(c, chain_count))
                })
                .collect()
        }
    }
}

/// Van der Waals radius per atom.
pub fn compute_atom_radii(elements: &[Element]) -> Vec<f32> {
    elements.iter().map(Element::vdw_radius).collect()
}
