use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Lynx Developers",
    version,
    about = "Lynx CLI - Force-field table validation, HOOMD morphology repair and M1 catalyst system generation.",
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

    /// Path to a configuration file in TOML format.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S generate.crystal-separation=30
    #[arg(
        short = 'S',
        long = "set",
        value_name = "KEY=VALUE",
        global = true,
        num_args(0..)
    )]
    pub set_values: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect, validate and normalize force-field XML tables.
    Ff(FfArgs),
    /// Repair or wrap HOOMD XML morphologies.
    Morph(MorphArgs),
    /// Build a two-plate M1 catalyst system from a unit-cell template.
    Generate(GenerateArgs),
    /// Plan or run the CI provisioning sequence.
    Ci(CiArgs),
}

/// Arguments for the `ff` subcommand.
#[derive(Args, Debug)]
pub struct FfArgs {
    #[command(subcommand)]
    pub command: FfCommands,
}

/// Force-field table operations.
#[derive(Subcommand, Debug)]
pub enum FfCommands {
    /// Parse a force field and check its data integrity.
    Validate {
        /// File path or library name of the force field (e.g., 'FF_opls_uff').
        #[arg(value_name = "NAME_OR_PATH")]
        forcefield: String,

        /// Directory searched for force-field names before the working directory.
        #[arg(long, value_name = "DIR")]
        library: Option<PathBuf>,

        /// Treat warnings as failures.
        #[arg(long)]
        strict: bool,
    },
    /// Print a summary of the force field and its atom types.
    Show {
        #[arg(value_name = "NAME_OR_PATH")]
        forcefield: String,

        #[arg(long, value_name = "DIR")]
        library: Option<PathBuf>,
    },
    /// Parse a force field and write it back out in canonical form.
    Normalize {
        #[arg(value_name = "NAME_OR_PATH")]
        forcefield: String,

        #[arg(long, value_name = "DIR")]
        library: Option<PathBuf>,

        /// Output path for the normalized table.
        #[arg(short, long, required = true, value_name = "PATH")]
        output: PathBuf,
    },
}

/// Arguments for the `morph` subcommand.
#[derive(Args, Debug)]
pub struct MorphArgs {
    #[command(subcommand)]
    pub command: MorphCommands,
}

#[derive(Subcommand, Debug)]
pub enum MorphCommands {
    /// Rejoin bonded molecules split across the periodic boundary.
    FixImages {
        /// Input HOOMD XML morphology.
        #[arg(value_name = "PATH")]
        input: PathBuf,

        /// Output path. Defaults to overwriting the input.
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Fold positions into the periodic box and update image flags.
    Wrap {
        #[arg(value_name = "PATH")]
        input: PathBuf,

        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

/// Arguments for the `generate` subcommand.
#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Unit-cell template in HOOMD XML format.
    #[arg(short = 't', long, value_name = "PATH")]
    pub template: Option<String>,

    /// Relative abundance of metal species, e.g. "{'Mo': 1, 'V': 0.3}".
    #[arg(short = 's', long, value_name = "STOICH")]
    pub stoichiometry: Option<String>,

    /// Number of unit cells along x, y and z, e.g. 2x2x1.
    #[arg(short = 'd', long, value_name = "AxBxC")]
    pub dimensions: Option<String>,

    /// Separation between the bottom planes of the two plates, in Angstroms.
    #[arg(short = 'c', long, value_name = "FLOAT")]
    pub crystal_separation: Option<f64>,

    /// Box length along z, in nm.
    #[arg(short = 'z', long, value_name = "FLOAT")]
    pub z_box_size: Option<f64>,

    /// Number of hydrocarbon molecules placed between the plates.
    #[arg(short = 'n', long, value_name = "INT")]
    pub number_of_organic_mols: Option<usize>,

    /// Force field to validate before generating (path or library name).
    #[arg(short = 'f', long, value_name = "NAME_OR_PATH")]
    pub forcefield: Option<String>,

    /// Directory searched for force-field names.
    #[arg(long, value_name = "DIR")]
    pub library: Option<PathBuf>,

    /// Do not bond neighbouring unit cells to each other.
    #[arg(long)]
    pub no_periodic_bonds: bool,

    /// Seed for the site-substitution random number generator.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Output path. Defaults to a name derived from the non-default parameters.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `ci` subcommand.
#[derive(Args, Debug)]
pub struct CiArgs {
    #[command(subcommand)]
    pub command: CiCommands,
}

#[derive(Subcommand, Debug)]
pub enum CiCommands {
    /// Print the provisioning steps without running them.
    Plan {
        /// Branch under test. Defaults to the configured environment variable.
        #[arg(short, long, value_name = "NAME")]
        branch: Option<String>,
    },
    /// Run the provisioning steps, stopping at the first failure.
    Run {
        #[arg(short, long, value_name = "NAME")]
        branch: Option<String>,
    },
}
