//! Interchange with the outside world.
//!
//! Structure and trajectory parsing for real file formats belongs to an external
//! loader. This module only defines the traits that loader plugs into
//! ([`traits::MolecularFile`], [`traits::FrameSource`]) and a plain CSV
//! interchange used by the command-line front end and in tests.

pub mod csv;
pub mod memory;
pub mod traits;
