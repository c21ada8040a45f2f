// centavo: CLI front-end for the expense ledger.
// Argument parsing, data-dir resolution, one command per invocation.

mod cli;

use centavo_core::commands;
use centavo_core::{Store, StoreConfig};
use dirs_next::home_dir;
use std::io::{self, ErrorKind};
use std::path::PathBuf;

fn main() -> io::Result<()> {
    env_logger::init();

    let args = cli::parse();
    let data_dir = resolve_data_dir(args.data_dir)?;
    let store = Store::new(StoreConfig::new(data_dir));

    let message = args.message.join(" ");
    let message = if message.trim().is_empty() {
        // Bare invocation: show the command help
        "ayuda".to_string()
    } else {
        message
    };

    println!("{}", commands::dispatch(&store, &message));
    Ok(())
}

/// Resolve the data directory.
///
/// Precedence:
/// 1. `--data-dir` CLI flag
/// 2. `CENTAVO_HOME` environment variable
/// 3. `~/.centavo` default
fn resolve_data_dir(flag: Option<PathBuf>) -> io::Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir);
    }
    if let Ok(home) = std::env::var("CENTAVO_HOME") {
        return Ok(PathBuf::from(home));
    }
    let home = home_dir().ok_or_else(|| {
        io::Error::new(ErrorKind::NotFound, "could not determine home directory")
    })?;
    Ok(home.join(".centavo"))
}
