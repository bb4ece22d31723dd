pub mod resolve;
pub mod serve;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Caching DNS resolver supporting iterative, forwarding, and DNS-over-HTTPS resolution
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the configuration file
    #[arg(
        short,
        long,
        default_value = "/etc/resolvd/resolvd.toml",
        env = "CONFIG_PATH"
    )]
    config_path: PathBuf,
    #[command(subcommand)]
    inner: Commands,
}

impl Args {
    pub async fn run(self) {
        let config = crate::config::Config::load(&self.config_path);
        match self.inner {
            Commands::Serve(inner) => inner.run(config).await,
            Commands::Resolve(inner) => inner.run(config).await,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    Serve(serve::Command),
    Resolve(resolve::Command),
}
