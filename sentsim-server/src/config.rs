use std::path::{Path, PathBuf};

use clap::Parser;
use sentsim_core::config::Config;

const DEFAULT_CONFIG_PATH: &str = "sentsim.toml";

#[derive(Parser, Debug)]
#[command(name = "sentsim-server")]
struct Cli {
    /// Path to the configuration file (defaults to ./sentsim.toml when present)
    #[arg(long = "config")]
    config: Option<PathBuf>,
    /// Port to listen on, overriding server.port
    #[arg(long, env = "PORT")]
    port: Option<u16>,
}

/// Parse the command line and load the configuration it points at.
pub fn load() -> Result<Config, String> {
    resolve(Cli::parse())
}

fn resolve(cli: Cli) -> Result<Config, String> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_file_or_default(Path::new(DEFAULT_CONFIG_PATH))?,
    };
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    Ok(config)
}
