use std::path::PathBuf;

use clap::Parser;

use crate::orchestrator::RunMode;

#[derive(Debug, Parser)]
#[command(name = "tinderbox", version, about = "Perception-driven task agent for a desktop game window")]
pub struct Cli {
    /// Attempt the task this many times instead of draining the resource
    #[arg(short = 'n', long = "count", value_name = "N", conflicts_with = "test")]
    pub count: Option<u32>,

    /// Attempt the task once and exit
    #[arg(short, long)]
    pub test: bool,

    /// Re-detect the window region before running
    #[arg(short, long = "refresh-window")]
    pub refresh_window: bool,

    /// Diagnostics and interactive questions only; never moves the mouse
    #[arg(short, long)]
    pub observe: bool,

    /// Config file (default: tinderbox.toml next to the binary, cwd, or user config dir)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write the default config to --config (or ./tinderbox.toml) and exit
    #[arg(long)]
    pub init_config: bool,
}

impl Cli {
    pub fn mode(&self) -> RunMode {
        if self.test {
            RunMode::Iterations(1)
        } else if let Some(n) = self.count {
            RunMode::Iterations(n)
        } else {
            RunMode::DrainAll
        }
    }
}
