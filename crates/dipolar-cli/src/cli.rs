use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

const COMPUTE_AFTER_HELP: &str = "\
Progress is shown as a bar on the terminal. Each checkpoint is also logged as
'<percent> % <elapsed>' at INFO level; pass -v to see those lines.";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "dipolar - total magnetic dipole-dipole energy of a point set, evaluated over every pair by a bounded worker pipeline.",
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
    /// Also the default size of the energy worker pool.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate the total dipole-dipole energy of every pair in an input file.
    #[command(after_help = COMPUTE_AFTER_HELP)]
    Compute(ComputeArgs),
    /// Load an input file and report what would be computed, without computing it.
    Inspect(InspectArgs),
}

/// Arguments for the `compute` subcommand.
#[derive(Args, Debug)]
pub struct ComputeArgs {
    /// Path to the input dipole list (`x y z mx my mz` per line).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the sampled energy report.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub records: RecordArgs,

    // --- Pipeline Overrides ---
    /// Override the number of concurrent energy workers.
    #[arg(long, value_name = "INT")]
    pub workers: Option<usize>,

    /// Override the capacity of the pair queue.
    #[arg(long = "pair-queue", value_name = "INT")]
    pub pair_queue_capacity: Option<usize>,

    /// Override the capacity of the result queue.
    #[arg(long = "result-queue", value_name = "INT")]
    pub result_queue_capacity: Option<usize>,

    /// Override the target number of sampled lines in the report.
    #[arg(long, value_name = "INT")]
    pub write_step: Option<u64>,

    /// Cross-check the pipeline total against a direct summation.
    #[arg(long)]
    pub verify: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S pipeline.write-step=50
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to the input dipole list.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    #[command(flatten)]
    pub records: RecordArgs,
}

/// Record selection shared by every subcommand that reads an input file.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct RecordArgs {
    /// Read at most this many records from the start of the input.
    #[arg(short = 'n', long, value_name = "INT")]
    pub limit: Option<usize>,

    /// Skip malformed lines with a warning instead of failing.
    #[arg(long)]
    pub skip_malformed: bool,
}
