//! # Workflows Module
//!
//! High-level entry points that tie the [`core`](crate::core) algorithms and the
//! [`engine`](crate::engine) numerics together.
//!
//! ## Architecture
//!
//! - **Topology** ([`topology`]) - Bonds, chains, backbone segments and sequences for a
//!   freshly loaded structure
//! - **Playback** ([`playback`]) - Playback clock with explicit per-session state
//! - **Dynamics Session** ([`dynamics`]) - Owns a structure, its streaming trajectory,
//!   the angle table and the background workers, and produces positions, angles
//!   and ribbons for the current playback time

pub mod dynamics;
pub mod playback;
pub mod topology;
