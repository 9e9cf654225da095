//! Command-line arguments

use std::path::PathBuf;

use clap::Parser;

use crate::build_info;

/// Collects and analyses GPU related info to help fix graphics problems and set the system up properly
#[derive(Debug, Clone, Parser)]
#[command(name = "gfx-health-check", version, long_version = build_info::LONG_VERSION)]
pub struct Cli {
    /// Directory to place the report archive in [default: system temp dir]
    #[arg(long, value_name = "DIR")]
    pub report_dir: Option<PathBuf>,

    /// Directory to store all temporary files in [default: system temp dir]
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Don't clear the working directory after finishing
    #[arg(long)]
    pub no_clear: bool,

    /// Skip creating the report archive
    #[arg(long)]
    pub no_report: bool,

    /// Additional configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Directory the archive is written to
    pub fn report_dir(&self) -> PathBuf {
        self.report_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Parent of the working directory
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}
