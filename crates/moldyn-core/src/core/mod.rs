//! # Core Module
//!
//! Data models and stateless algorithms that every other layer builds on.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Parallel atom arrays, residues, chains,
//!   bonds, backbone segments and simulation boxes
//! - **Spatial Indexing** ([`spatial`]) - Uniform hash grid for radius-bounded neighbor queries
//! - **Topology Inference** ([`topology`]) - Covalent bonds, chains and backbone segments
//! - **Per-Atom Attributes** ([`coloring`]) - Colour mappings and atom radii
//! - **Interchange** ([`io`]) - CSV atom tables and trajectory streams
//! - **Utilities** ([`utils`]) - Geometry helpers and residue/atom name identifiers
//!
//! Everything in this module is free of shared mutable state: inputs are borrowed,
//! outputs are freshly allocated, and derived arrays are recomputed wholesale when
//! their inputs change.

pub mod coloring;
pub mod io;
pub mod models;
pub mod spatial;
pub mod topology;
pub mod utils;
