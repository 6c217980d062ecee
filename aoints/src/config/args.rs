//! Command-line argument parsing

use aoints::ortho::OrthoType;
use clap::Parser;

/// One-electron integrals, orthogonalization and core guess from a YAML configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    pub config_file: String,

    /// Override output file: (default stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Override orthogonalization route (cholesky or lowdin)
    #[arg(long)]
    pub ortho_type: Option<OrthoType>,

    /// Check the orthogonalization identities after computing them
    #[arg(long)]
    pub verify_ortho: bool,

    /// Molecular charge (default: 0 for neutral)
    #[arg(long)]
    pub charge: Option<i32>,

    /// Number of worker threads (default: all available cores)
    #[arg(long)]
    pub num_threads: Option<usize>,
}
