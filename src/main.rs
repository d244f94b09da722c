//! DishaNav daemon entry point
//!
//! Loads the calibration profile, wires up the configured devices, and
//! runs one traversal session until completion or Ctrl-C.

use disha_nav::config::DishaConfig;
use disha_nav::devices::{create_actuator, create_debug_sink, create_frame_source};
use disha_nav::drivers::SystemClock;
use disha_nav::error::{DishaError, Result};
use disha_nav::orchestrator::Orchestrator;
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Parse config path from command line arguments.
///
/// Supports:
/// - `disha-nav <path>` (positional)
/// - `disha-nav --config <path>` (flag-based)
/// - `disha-nav -c <path>` (short flag)
///
/// Defaults to `/etc/disha-nav.toml` if not specified.
fn parse_config_path() -> String {
    let args: Vec<String> = env::args().collect();

    // Look for --config or -c flag
    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }

    // Fall back to first positional argument (if it doesn't start with -)
    if args.len() > 1 && !args[1].starts_with('-') {
        return args[1].clone();
    }

    // Default path
    "/etc/disha-nav.toml".to_string()
}

fn main() -> Result<()> {
    let config_path = parse_config_path();
    let config = DishaConfig::load(&config_path)?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&config.logging.level),
    )
    .init();

    log::info!("DishaNav starting (config: {})", config_path);
    log::info!(
        "Grid {}x{}, camera {}x{}, wiring {:?}",
        config.grid.rows,
        config.grid.cols,
        config.camera.width,
        config.camera.height,
        config.motion.wiring
    );

    let actuator = create_actuator(&config)?;
    let frames = create_frame_source(&config)?;

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| DishaError::Config(format!("Error setting Ctrl-C handler: {}", e)))?;

    let mut orchestrator = Orchestrator::new(&config, actuator, frames, SystemClock, running)?;
    if let Some(sink) = create_debug_sink(&config)? {
        orchestrator = orchestrator.with_debug_sink(sink);
    }

    log::info!("DishaNav running. Press Ctrl-C to stop.");
    let result = orchestrator.run();

    let status = orchestrator.status();
    log::info!(
        "DishaNav stopped - {}/{} cells visited ({:.0}%)",
        status.visited,
        status.total,
        status.percent_complete
    );
    result
}
