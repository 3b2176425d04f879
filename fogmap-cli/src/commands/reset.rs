//! Reset command - delete every explored point.

use std::sync::Arc;

use fogmap::app::open_store;
use fogmap::config::ConfigFile;
use fogmap::render::NullRenderer;
use fogmap::tracker::ExplorationTracker;

use super::common::runtime;
use crate::error::CliError;

/// Run the reset command.
pub fn run(config: &ConfigFile, yes: bool) -> Result<(), CliError> {
    if !yes {
        return Err(CliError::Config(
            "Reset deletes every explored point. Re-run with --yes to confirm.".to_string(),
        ));
    }

    let store = open_store(config)?;
    let location = store.location().to_string();
    let tracker = ExplorationTracker::new(
        Arc::new(store),
        Arc::new(NullRenderer),
        config.tracker_config(),
    );

    let removed = runtime()?.block_on(tracker.reset())?;
    println!("Removed {} explored points from {}", removed, location);
    Ok(())
}
