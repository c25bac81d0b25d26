use clap::{Args, Parser, Subcommand};
use moldyn::core::coloring::ColorMapping;
use moldyn::engine::interpolation::InterpolationMode;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "The moldyn developers",
    version,
    about = "moldyn - Topology inference, backbone analysis and periodic-aware interpolation for molecular dynamics trajectories.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Infer bonds, chains and backbone of a structure and print a summary.
    Topology(TopologyArgs),
    /// Compute backbone torsions (omega, phi, psi) for every trajectory frame.
    Angles(AnglesArgs),
    /// Interpolate atom positions at a fractional frame time.
    Interpolate(InterpolateArgs),
    /// Compute the backbone ribbon spline of every chain.
    Spline(SplineArgs),
}

/// Configuration sources shared by all subcommands.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to an analysis configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the neighbour search radius of bond inference (Å).
    #[arg(long, value_name = "FLOAT")]
    pub search_radius: Option<f32>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S spline.subdivisions=12
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `topology` subcommand.
#[derive(Args, Debug, Clone)]
pub struct TopologyArgs {
    /// Path to the input atom table (CSV).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Write the inferred bonds as an `atom_a,atom_b` table.
    #[arg(long, value_name = "PATH")]
    pub bonds_out: Option<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for the `angles` subcommand.
#[derive(Args, Debug, Clone)]
pub struct AnglesArgs {
    /// Path to the input atom table (CSV).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path to the trajectory (CSV).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub trajectory: PathBuf,

    /// Path for the output angle table (CSV, degrees).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for the `interpolate` subcommand.
#[derive(Args, Debug, Clone)]
pub struct InterpolateArgs {
    /// Path to the input atom table (CSV).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path to the trajectory (CSV).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub trajectory: PathBuf,

    /// Frame time; the fractional part blends towards the next frame.
    #[arg(long, required = true, value_name = "FLOAT")]
    pub time: f64,

    /// Interpolation scheme, overriding the config file.
    #[arg(short, long, value_name = "MODE")]
    pub mode: Option<InterpolationMode>,

    /// Path for the output atom table (CSV).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for the `spline` subcommand.
#[derive(Args, Debug, Clone)]
pub struct SplineArgs {
    /// Path to the input atom table (CSV).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Optional trajectory (CSV); positions are taken at `--time`.
    #[arg(short, long, value_name = "PATH", requires = "time")]
    pub trajectory: Option<PathBuf>,

    /// Frame time within the trajectory.
    #[arg(long, value_name = "FLOAT", requires = "trajectory")]
    pub time: Option<f64>,

    /// Interpolation scheme used with `--time`, overriding the config file.
    #[arg(short, long, value_name = "MODE")]
    pub mode: Option<InterpolationMode>,

    /// Override the number of spline points per residue.
    #[arg(long, value_name = "INT")]
    pub subdivisions: Option<usize>,

    /// Override the cardinal spline tension (0 to 1).
    #[arg(long, value_name = "FLOAT")]
    pub tension: Option<f32>,

    /// Atom colour mapping: cpk, residue-name, residue-index, chain-index or #RRGGBB.
    #[arg(long, value_name = "MAPPING")]
    pub coloring: Option<ColorMapping>,

    /// Path for the output spline table (CSV).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    #[command(flatten)]
    pub config: ConfigArgs,
}
