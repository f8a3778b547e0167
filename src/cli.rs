use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "license-matcher",
    about = "Identify license texts against a catalog of known SPDX licenses",
    version
)]
pub struct Cli {
    /// License files or directories to scan
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Read one license text from standard input instead of scanning paths
    #[arg(long, conflicts_with = "paths")]
    pub stdin: bool,

    /// Matcher config file [default: ./.license-matcher/config.toml, fallback ~/.config/license-matcher/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// Minimum fuzzy score (0-100) for every fuzzy strategy
    #[arg(long, value_name = "SCORE", value_parser = clap::value_parser!(u8).range(0..=100))]
    pub threshold: Option<u8>,

    /// Exit with code 1 if any input is unknown or unreadable
    #[arg(long)]
    pub strict: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print the summary line and errors
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
}
