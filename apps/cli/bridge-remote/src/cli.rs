use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

/// Connect to and discover scraper bridges on the local network.
#[derive(Debug, Parser)]
#[command(name = "bridge-remote", version, about)]
pub struct Cli {
    /// Directory holding remote.toml
    #[arg(long, global = true, env = "BRIDGE_CONFIG_DIR", value_name = "DIR")]
    pub config: Option<PathBuf>,

    /// Log at trace level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the saved connection and effective settings
    Status,

    /// Connect to a bridge once and report the outcome
    Connect {
        /// IP address or hostname, optionally with scheme or port
        host: String,
        /// Port; anything unparsable falls back to the default
        port: Option<String>,
    },

    /// Scan the local network for bridges (Ctrl-C cancels)
    Scan {
        /// Overall scan budget, e.g. "5s"
        #[arg(long, value_parser = humantime::parse_duration)]
        timeout: Option<Duration>,
    },

    /// Delete the saved connection
    Forget,

    /// Connect and print connection events until Ctrl-C or the bridge is lost
    Watch {
        host: String,
        port: Option<String>,
    },
}
