//! List command - print stored explored points.

use fogmap::app::open_store;
use fogmap::config::ConfigFile;
use fogmap::store::ExploredStore;

use super::common::runtime;
use crate::error::CliError;

/// Run the list command.
pub fn run(config: &ConfigFile, limit: Option<usize>) -> Result<(), CliError> {
    let store = open_store(config)?;
    let points = runtime()?.block_on(store.load_all())?;

    if points.is_empty() {
        println!("No explored points in {}", store.location());
        return Ok(());
    }

    println!(
        "{:>8}  {:>11}  {:>12}  recorded (UTC)",
        "id", "latitude", "longitude"
    );
    let shown = limit.unwrap_or(points.len()).min(points.len());
    for point in &points[..shown] {
        println!(
            "{:>8}  {:>11.6}  {:>12.6}  {}",
            point.id,
            point.coordinate.latitude(),
            point.coordinate.longitude(),
            point.recorded_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    if shown < points.len() {
        println!("... {} more", points.len() - shown);
    }

    Ok(())
}
