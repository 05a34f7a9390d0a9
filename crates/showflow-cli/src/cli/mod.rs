//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use showflow_core::config::Config;
use showflow_core::logging;

mod commands;

#[derive(Parser)]
#[command(name = "showflow")]
#[command(version)]
#[command(about = "Timer-driven splash → sheet → popup → promo presentation sequencer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug level (RUST_LOG still takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// How views are written to stdout.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One aligned line per change
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Run the presentation in real time, reading actions from stdin
    Run {
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Replay a TOML script of timed events on a virtual clock
    Simulate {
        /// Path to the script file
        script: PathBuf,

        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Generate a fresh config from Rust defaults (for xtask)
    Generate,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Config commands must work even when the current config is broken.
    let command = match cli.command {
        Commands::Config { command } => {
            return match command {
                ConfigCommands::Path => {
                    commands::config::path();
                    Ok(())
                }
                ConfigCommands::Init => commands::config::init(),
                ConfigCommands::Generate => commands::config::generate(),
            };
        }
        command => command,
    };

    let config = Config::load().context("load config")?;
    let _log_guard = logging::init(&config.log, cli.verbose).context("init logging")?;

    match command {
        Commands::Simulate { script, format } => {
            commands::simulate::run(&script, format, &config)
        }
        Commands::Run { format } => {
            let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
            let result = rt.block_on(commands::run::run(&config, format));
            // A pending stdin read cannot be cancelled; don't wait for it.
            rt.shutdown_background();
            result
        }
        Commands::Config { .. } => Ok(()),
    }
}
