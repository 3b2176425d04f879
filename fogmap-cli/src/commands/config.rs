//! `fogmap config` - inspect and edit the settings file.
//!
//! Keys are addressed as `section.key`, e.g. `render.mode`. Writes go through
//! the same validation the loader applies.

use clap::Subcommand;
use fogmap::config::{config_file_path, ConfigFile, ConfigKey};

use crate::error::CliError;

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print one setting
    Get {
        /// Setting name, e.g. tracking.revisit_threshold_m
        key: String,
    },

    /// Change one setting and save the file
    Set {
        /// Setting name, e.g. render.mode
        key: String,

        /// New value
        value: String,
    },

    /// Print every setting, marking the ones changed from their defaults
    List,

    /// Print where the settings file lives
    Path,
}

pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => run_get(&key),
        ConfigCommands::Set { key, value } => run_set(&key, &value),
        ConfigCommands::List => run_list(),
        ConfigCommands::Path => run_path(),
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "No setting named '{}' (see 'fogmap config list')",
            key
        ))
    })
}

fn run_get(key: &str) -> Result<(), CliError> {
    let key = parse_key(key)?;
    println!("{}", key.get(&ConfigFile::load()?));
    Ok(())
}

fn run_set(key: &str, value: &str) -> Result<(), CliError> {
    let key = parse_key(key)?;
    let mut config = ConfigFile::load()?;
    let previous = key.get(&config);
    key.set(&mut config, value)?;
    let path = config.save()?;

    println!("{}: {} -> {}", key, previous, key.get(&config));
    println!("(written to {})", path.display());
    Ok(())
}

fn run_list() -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    for line in settings_table(&config) {
        println!("{}", line);
    }
    Ok(())
}

/// One aligned `name  value` row per key; `*` marks non-default values.
fn settings_table(config: &ConfigFile) -> Vec<String> {
    let defaults = ConfigFile::default();
    let width = ConfigKey::all()
        .iter()
        .map(|key| key.name().len())
        .max()
        .unwrap_or(0);

    ConfigKey::all()
        .iter()
        .map(|key| {
            let value = key.get(config);
            let marker = if value != key.get(&defaults) { '*' } else { ' ' };
            format!("{} {:<width$}  {}", marker, key.name(), value, width = width)
        })
        .collect()
}

fn run_path() -> Result<(), CliError> {
    println!("{}", config_file_path()?.display());
    Ok(())
}
