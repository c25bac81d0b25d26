//! # moldyn Core Library
//!
//! Topology inference and geometric descriptors for time-varying atomic
//! structures (molecular dynamics trajectories): covalent bonds, chains and
//! backbone segments, backbone dihedral angles, periodic-boundary-aware
//! interpolation between trajectory frames, and smooth backbone splines.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`MolecularStructure`,
//!   `Element`, `BackboneSegment`), the spatial hash grid, and the pure topology
//!   algorithms (bond inference, chain and backbone derivation).
//!
//! - **[`engine`]: The Numerics.** Backbone angles (single frame and incremental
//!   trajectory tables), periodic-aware interpolation, the backbone spline builder,
//!   append-only trajectory storage, and the background workers that fill it.
//!
//! - **[`workflows`]: The Public API.** Entry points that tie `core` and `engine`
//!   together: deriving the topology of a freshly loaded structure, driving
//!   playback, and owning a full dynamics session with its worker threads.
//!
//! The loader that parses structure and trajectory files and the renderer that
//! consumes the produced arrays are external collaborators; this crate is a purely
//! in-memory transformation stage between them.

pub mod core;
pub mod engine;
pub mod workflows;
