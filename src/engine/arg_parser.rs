use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::dag::OPTIMIZE_GEOMETRY;

/// Indexing wrapper for CrystFEL's indexamajig and the workflow DAGs that drive it.
#[derive(Clone, Parser)]
#[command(name = "btx")]
#[command(about = "Write indexamajig batch scripts, report indexing rates, print workflow DAGs.")]
pub struct Cli {
    /// Verbose output.
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Subcommand)]
pub enum Commands {
    /// Write the indexing executable for a run; with --report, summarize its results instead.
    Index(IndexArgs),
    /// Print a workflow DAG declaration.
    Dag(DagArgs),
}

#[derive(Clone, Args)]
pub struct IndexArgs {
    /// Experiment name.
    #[arg(long, short = 'e')]
    pub exp: String,

    /// Run number.
    #[arg(long, short = 'r')]
    pub run: u32,

    /// Detector name, e.g. epix10k2M or jungfrau4M.
    #[arg(long, short = 'd')]
    pub det_type: String,

    /// Suffix extension for the stream file.
    #[arg(long)]
    pub tag: String,

    /// Tag identifying the input cxi files.
    #[arg(long)]
    pub tag_cxi: Option<String>,

    /// Base directory for indexing results.
    #[arg(long)]
    pub taskdir: PathBuf,

    /// Report indexing results to the summary file and the elog instead of writing the executable.
    #[arg(long)]
    pub report: bool,

    /// Elog URL for posting progress counters. Default: $JID_UPDATE_COUNTERS (also read from <TASKDIR>/.env).
    #[arg(long)]
    pub update_url: Option<String>,

    /// CrystFEL-style geometry file. Required unless reporting.
    #[arg(long)]
    pub geom: Option<PathBuf>,

    /// File containing unit cell information (.pdb or .cell).
    #[arg(long)]
    pub cell: Option<PathBuf>,

    /// Integration radii for peak, buffer and background regions. Default: 4,5,6.
    #[arg(long)]
    pub int_rad: Option<String>,

    /// Indexing methods. Default: xgandalf,mosflm,xds.
    #[arg(long)]
    pub methods: Option<String>,

    /// Tolerances for unit cell comparison: a,b,c,ang. Default: 5,5,5,1.5.
    #[arg(long)]
    pub tolerance: Option<String>,

    /// Skip the validation step that omits saturated peaks, peaks too close to the detector edge, etc. Default: true.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub no_revalidate: Option<bool>,

    /// Enable multi-lattice indexing. Default: true.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub multi: Option<bool>,

    /// Display timing data. Default: true.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub profile: Option<bool>,
}

#[derive(Clone, Args)]
pub struct DagArgs {
    /// DAG to print.
    #[arg(value_name = "DAG", default_value = OPTIMIZE_GEOMETRY)]
    pub name: String,

    /// Print the declaration as JSON for the scheduler instead of the edge list.
    #[arg(long)]
    pub json: bool,
}
