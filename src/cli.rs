//! Command-line flags of the `gatehouse` binary.

use std::path::PathBuf;

use clap::Parser;

/// Request-lifecycle HTTP API server.
#[derive(Debug, Parser)]
#[command(name = "gatehouse", disable_version_flag = true)]
pub struct Cli {
    /// Config file for the server
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the version and exit
    #[arg(short = 'v', long)]
    pub version: bool,
}

/// The string `--version` prints.
pub fn version_string() -> String {
    format!("v{}", env!("CARGO_PKG_VERSION"))
}
