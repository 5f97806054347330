use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "ifcreport")]
#[command(
    about = "Find IFC models in a hosted project tree and export property set reports",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve the target folder and list the model files it contains
    Search {
        /// Project tree snapshot (JSON) to search
        #[arg(long)]
        snapshot: PathBuf,
        /// Name of the folder to locate
        #[arg(long)]
        folder: String,
        /// Root folder ids to search from (defaults to the snapshot's roots)
        #[arg(long = "root")]
        roots: Vec<String>,
    },
    /// Generate and export the property report for all matching model files
    Report {
        /// Project tree snapshot (JSON) to search
        #[arg(long)]
        snapshot: PathBuf,
        /// Name of the folder to locate
        #[arg(long)]
        folder: String,
        /// Root folder ids to search from (defaults to the snapshot's roots)
        #[arg(long = "root")]
        roots: Vec<String>,
        /// Output file (defaults to <report_base_name>_<date>.csv)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print configuration values
    PrintConfig,
}
