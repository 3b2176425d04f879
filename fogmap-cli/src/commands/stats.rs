//! Stats command - summarize the explored area.

use fogmap::app::open_store;
use fogmap::config::ConfigFile;
use fogmap::model::GeoBounds;
use fogmap::store::ExploredStore;

use super::common::runtime;
use crate::error::CliError;

/// Run the stats command.
pub fn run(config: &ConfigFile) -> Result<(), CliError> {
    let store = open_store(config)?;
    let points = runtime()?.block_on(store.load_all())?;

    println!("Exploration Statistics");
    println!("======================");
    println!();
    println!("Database:        {}", store.location());
    println!("Explored points: {}", points.len());

    let Some(bounds) = GeoBounds::from_coordinates(points.iter().map(|p| &p.coordinate)) else {
        return Ok(());
    };
    let center = bounds.center();
    println!(
        "Bounds:          lat {:.6}..{:.6}, lon {:.6}..{:.6}",
        bounds.min_lat, bounds.max_lat, bounds.min_lon, bounds.max_lon
    );
    println!("Center:          {}", center);

    // Rows are in id order, which is creation order
    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        println!(
            "First recorded:  {}",
            first.recorded_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        println!(
            "Last recorded:   {}",
            last.recorded_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }

    Ok(())
}
