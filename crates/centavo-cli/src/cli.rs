//! Argument parsing for the centavo binary.

use clap::Parser;
use std::path::PathBuf;

/// Personal expense ledger. Send it the same messages you would text the
/// bot: `centavo gasto 15000 almuerzo`, `centavo mes`, `centavo resumen`.
#[derive(Debug, Parser)]
#[command(name = "centavo", version)]
pub struct Cli {
    /// Data directory (defaults to $CENTAVO_HOME, then ~/.centavo)
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// The command message, e.g. `gasto 15000 almuerzo`. Empty shows help.
    pub message: Vec<String>,
}

pub fn parse() -> Cli {
    Cli::parse()
}
