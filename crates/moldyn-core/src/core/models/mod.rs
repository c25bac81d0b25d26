//! # Core Models Module
//!
//! Data structures describing a loaded molecular structure.
//!
//! ## Overview
//!
//! A structure is stored as parallel per-atom arrays (position, element, label,
//! residue index) plus residue, chain, bond and backbone tables that refer to atoms
//! and residues by index. Topology (element, label, residue index) is immutable for
//! the lifetime of a load; positions are rewritten every frame.
//!
//! ## Key Components
//!
//! - [`atom`] - Chemical elements and their radii/colours
//! - [`residue`] - Contiguous atom ranges with a name and sequence id
//! - [`chain`] - Contiguous residue ranges derived from inter-residue bonds
//! - [`topology`] - Bonds and backbone segments
//! - [`simulation_box`] - Periodic simulation cell
//! - [`frame`] - Positions and cell of one trajectory frame
//! - [`structure`] - The complete structure and its builder
//!
//! ## Usage
//!
//! ```ignore
//! use moldyn::core::models::atom::Element;
//! use moldyn::core::models::structure::StructureBuilder;
//! use nalgebra::Point3;
//!
//! let mut builder = StructureBuilder::new();
//! builder.start_residue(1, "ALA");
//! builder.add_atom("N", Element::Nitrogen, Point3::new(0.0, 0.0, 0.0));
//! builder.add_atom("CA", Element::Carbon, Point3::new(1.46, 0.0, 0.0));
//! let structure = builder.build()?;
//! ```

pub mod atom;
pub mod chain;
pub mod frame;
pub mod residue;
pub mod simulation_box;
pub mod structure;
pub mod topology;
