// CLI definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "emu_controller")]
#[command(author, version, about = "Virtual HID game controller")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file path (default: ~/.config/emucontroller/controller.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the controller: trigger, host read pump and animated input
    Run {
        /// Stop after this many seconds (default: until Ctrl-C)
        #[arg(long)]
        duration_secs: Option<u64>,

        /// Interval between gamepad state updates
        #[arg(long, default_value = "16")]
        feed_interval_ms: u64,
    },

    /// Print descriptors and strings as the host sees them
    #[command(visible_alias = "desc")]
    Descriptor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Walk through the request lifecycle and print every completion
    Scenario {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Config file management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write the default config
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective config
    Show,
}
