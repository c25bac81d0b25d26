//! # Engine Module
//!
//! Stateful numerics and the concurrency model of a dynamics session.
//!
//! ## Overview
//!
//! The engine turns a structure with derived topology and a stream of trajectory
//! frames into the continuous-time quantities a viewer needs: interpolated atom
//! positions at arbitrary playback times, backbone torsions per frame, and
//! smooth backbone ribbons.
//!
//! ## Architecture
//!
//! - **Backbone Angles** ([`angles`]) - Per-residue omega/phi/psi for one frame and the
//!   append-only per-frame angle table
//! - **Interpolation** ([`interpolation`]) - Nearest, linear and cubic blending between
//!   frames with per-axis periodic unwrapping
//! - **Splines** ([`spline`]) - Backbone ribbon samples with orientation frames
//! - **Trajectory Storage** ([`trajectory`]) - Lock-free, append-only frame storage with
//!   a published frame counter
//! - **Workers** ([`worker`], [`tasks`]) - Task handles with cancellation tokens, and the
//!   trajectory loader and angle worker built on them
//! - **Configuration** ([`config`]) - Analysis parameters and their builder
//! - **Progress Monitoring** ([`progress`]) - Progress events for front ends
//! - **Error Handling** ([`error`]) - Engine error type
//!
//! ## Concurrency
//!
//! Shared per-frame data is written by exactly one background thread and read by
//! any number of others. Writers fill a slot completely before publishing it
//! through an atomic frame counter, and readers never look past that counter, so
//! no locks are needed on the hot path.

pub mod angles;
pub mod config;
pub mod error;
pub mod interpolation;
pub mod progress;
pub mod spline;
pub mod tasks;
pub mod trajectory;
pub mod worker;
