//! CLI argument definitions.

use clap::{Parser, Subcommand};

/// Monocle - live uptime-monitoring dashboard client
#[derive(Parser, Debug)]
#[command(name = "monocle")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// API server base URL (overrides MONOCLE_API_URL)
    #[arg(long)]
    pub server: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch a project's dashboard with live updates
    Watch {
        /// Project to watch
        project_id: String,

        /// Periodic fallback refresh interval in seconds (0 disables)
        #[arg(long, default_value_t = 60)]
        interval: u64,
    },

    /// Print recent check history for a monitor
    Checks {
        /// Project the monitor belongs to
        project_id: String,

        /// Monitor to inspect
        monitor_id: String,
    },
}
