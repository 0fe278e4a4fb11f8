use clap::Parser;
use ferry_core::AppKind;

pub mod commands;
pub mod global;

pub use commands::{
    AuthCommands, BookingCommands, Commands, LookupCommands, QueueCommands, StatsCommands,
    VerifyCommands,
};
pub use global::{GlobalFlags, OutputFormat};

/// Top-level CLI parser for the `ferry` binary.
#[derive(Debug, Parser)]
#[command(name = "ferry", version, about = "Ferry gate checker and booking client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Client profile: checker or customer (overrides config)
    #[arg(short, long, global = true)]
    pub app: Option<AppKind>,
}

impl Cli {
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
            app: self.app,
        }
    }
}
