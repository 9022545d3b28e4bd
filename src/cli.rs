use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long)] // defaults to config/config.toml in main.rs
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Run a single scan cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Log alerts instead of sending them to Telegram
    #[arg(long)]
    pub dry_run: bool,
}
