//! Track command - replay a recorded track through a full exploration session.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use fogmap::app::{FogMapApp, RendererHandle};
use fogmap::config::ConfigFile;
use fogmap::position::{PermissionGate, ReplaySource, StaticPermission};
use tokio::sync::mpsc;
use tracing::info;

use super::common::{load_track, resolve_render_mode, runtime, RendererArg};
use crate::error::CliError;

/// Arguments for the track command.
pub struct TrackArgs {
    pub file: PathBuf,
    pub renderer: Option<RendererArg>,
    pub pace_ms: u64,
    pub deny_permission: bool,
}

/// Run the track command.
pub fn run(args: TrackArgs, config: &ConfigFile) -> Result<(), CliError> {
    let fixes = load_track(&args.file, config.position_config().min_interval)?;
    let mode = resolve_render_mode(args.renderer, config);

    println!("FogMap Track Replay v{}", fogmap::VERSION);
    println!("=========================");
    println!();
    println!("Track:    {} ({} fixes)", args.file.display(), fixes.len());
    println!("Database: {}", config.storage.database.display());
    println!("Renderer: {}", mode);
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    // Set up signal handler for graceful shutdown
    let (stop_tx, mut stop_rx) = mpsc::unbounded_channel::<()>();
    ctrlc::set_handler(move || {
        let _ = stop_tx.send(());
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let permission: Arc<dyn PermissionGate> = if args.deny_permission {
        Arc::new(StaticPermission::denied())
    } else {
        Arc::new(StaticPermission::granted())
    };
    let source = Arc::new(ReplaySource::new(fixes).with_pace(Duration::from_millis(args.pace_ms)));

    let mut run_config = config.clone();
    run_config.render.mode = mode;

    let rt = runtime()?;
    rt.block_on(async move {
        let app = FogMapApp::build(&run_config, source, permission)?;
        let (mut session, renderer) = app.into_parts();

        let mut notices = session.subscribe();
        let notice_printer = tokio::spawn(async move {
            while let Ok(notice) = notices.recv().await {
                eprintln!("! {}", notice);
            }
        });

        let (overlay, bridge_printer) = match renderer {
            RendererHandle::Overlay(overlay) => (Some(overlay), None),
            RendererHandle::Web(mut rx) => {
                let printer = tokio::spawn(async move {
                    while let Some(message) = rx.recv().await {
                        println!("{}", message);
                    }
                });
                (None, Some(printer))
            }
        };

        let started = session.start().await;
        if started.is_ok() {
            tokio::select! {
                _ = session.wait() => {}
                _ = stop_rx.recv() => {
                    println!();
                    println!("Received shutdown signal, stopping...");
                }
            }
        }

        let tracker = Arc::clone(session.tracker());
        let stats = session.shutdown().await;
        let points = tracker.explored().await.len();
        // Last handles on the notice sender and renderer are gone, so both printers end
        drop(tracker);
        let _ = notice_printer.await;
        if let Some(printer) = bridge_printer {
            let _ = printer.await;
        }
        started?;

        println!();
        println!("Session Summary");
        println!("───────────────");
        println!("  Fixes processed: {}", stats.fixes_processed);
        println!(
            "  New points:      {} ({} revisits, {:.0}% revisit rate)",
            stats.new_points,
            stats.revisits,
            stats.revisit_ratio() * 100.0
        );
        if stats.write_failures + stats.read_failures > 0 {
            println!(
                "  Store failures:  {} write, {} read",
                stats.write_failures, stats.read_failures
            );
        }
        println!("  Explored total:  {}", points);
        if let Some(frame) = overlay.and_then(|o| o.latest()) {
            println!(
                "  Overlay:         {} holes, frame {}",
                frame.holes.len(),
                frame.revision
            );
        }

        info!(points, "Track replay finished");
        Ok::<(), CliError>(())
    })
}
