//! FogMap CLI - Command-line interface
//!
//! Replays recorded tracks through the exploration tracker and manages the
//! explored point database and configuration.

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fogmap::config::ConfigFile;
use fogmap::logging::{init_logging, LoggingGuard};
use tracing::info;

use commands::common::{load_config, RendererArg};
use commands::config::ConfigCommands;
use commands::track::TrackArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "fogmap", version, about = "Reveal the map where you have been")]
struct Cli {
    /// Explored point database (overrides storage.database)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Log filter directive (overrides logging.level and is overridden by RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Replay a track file (lat,lon[,unix_ms] per line) through a tracking session
    Track {
        /// Track file to replay
        file: PathBuf,

        /// Renderer to drive (defaults to render.mode)
        #[arg(long, value_enum)]
        renderer: Option<RendererArg>,

        /// Delay between replayed fixes in milliseconds
        #[arg(long, default_value_t = 0)]
        pace_ms: u64,

        /// Simulate the user refusing location access
        #[arg(long)]
        deny_permission: bool,
    },

    /// Print stored explored points
    List {
        /// Show at most this many points
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Delete all explored points
    Reset {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Print point count and explored bounds
    Stats,

    /// View or modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Track { .. } => "track",
            Commands::List { .. } => "list",
            Commands::Reset { .. } => "reset",
            Commands::Stats => "stats",
            Commands::Config { .. } => "config",
        }
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let name = cli.command.name();
    match cli.command {
        Commands::Config { command } => commands::config::run(command),
        Commands::Track {
            file,
            renderer,
            pace_ms,
            deny_permission,
        } => {
            let ctx = CommandContext::open(cli.database, cli.log_level, name)?;
            commands::track::run(
                TrackArgs {
                    file,
                    renderer,
                    pace_ms,
                    deny_permission,
                },
                &ctx.config,
            )
        }
        Commands::List { limit } => {
            let ctx = CommandContext::open(cli.database, cli.log_level, name)?;
            commands::list::run(&ctx.config, limit)
        }
        Commands::Reset { yes } => {
            let ctx = CommandContext::open(cli.database, cli.log_level, name)?;
            commands::reset::run(&ctx.config, yes)
        }
        Commands::Stats => {
            let ctx = CommandContext::open(cli.database, cli.log_level, name)?;
            commands::stats::run(&ctx.config)
        }
    }
}

/// Settings and logging for commands that touch the explored point database.
struct CommandContext {
    config: ConfigFile,
    _logging: LoggingGuard,
}

impl CommandContext {
    fn open(
        database: Option<PathBuf>,
        log_level: Option<String>,
        command: &str,
    ) -> Result<Self, CliError> {
        let config = with_database_override(load_config()?, database);
        let level = log_level.unwrap_or_else(|| config.logging.level.clone());
        let logging = init_logging(&level, Some(&config.logging.directory))?;

        info!(version = fogmap::VERSION, command, "FogMap starting");
        Ok(Self {
            config,
            _logging: logging,
        })
    }
}

fn with_database_override(mut config: ConfigFile, database: Option<PathBuf>) -> ConfigFile {
    if let Some(database) = database {
        config.storage.database = database;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_track_options() {
        let cli = Cli::try_parse_from([
            "fogmap",
            "track",
            "walk.csv",
            "--renderer",
            "web",
            "--pace-ms",
            "250",
            "--deny-permission",
        ])
        .unwrap();

        let Commands::Track {
            file,
            renderer,
            pace_ms,
            deny_permission,
        } = cli.command
        else {
            panic!("expected track command");
        };
        assert_eq!(file, PathBuf::from("walk.csv"));
        assert_eq!(renderer, Some(RendererArg::Web));
        assert_eq!(pace_ms, 250);
        assert!(deny_permission);
    }

    #[test]
    fn test_global_database_override() {
        let cli = Cli::try_parse_from(["fogmap", "stats", "--database", "/tmp/x.db"]).unwrap();
        assert_eq!(cli.database, Some(PathBuf::from("/tmp/x.db")));
        assert_eq!(cli.command.name(), "stats");
    }

    #[test]
    fn test_database_override_applies_only_when_given() {
        let config = ConfigFile::default();
        let default_db = config.storage.database.clone();

        let kept = with_database_override(config.clone(), None);
        assert_eq!(kept.storage.database, default_db);

        let replaced = with_database_override(config, Some(PathBuf::from("/tmp/walks.db")));
        assert_eq!(replaced.storage.database, PathBuf::from("/tmp/walks.db"));
    }

    #[test]
    fn test_config_subcommands_parse() {
        let cli = Cli::try_parse_from(["fogmap", "config", "set", "render.mode", "web"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                command: ConfigCommands::Set { .. }
            }
        ));
    }
}
