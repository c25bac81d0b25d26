mod builder;
mod defaults;
mod file;

pub use builder::{CommandOverrides, build_config};
