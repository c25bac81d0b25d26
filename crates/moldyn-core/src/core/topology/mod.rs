//! # Topology Inference
//!
//! Derives connectivity from raw atom data: covalent bonds from a distance
//! heuristic ([`bonds`]), chains from inter-residue bonds ([`chains`]), and
//! per-residue backbone segments plus their contiguous sequences ([`backbone`]).
//!
//! All functions are pure: they borrow the atom arrays and return freshly
//! allocated tables that replace the previous ones wholesale.

pub mod backbone;
pub mod bonds;
pub mod chains;
