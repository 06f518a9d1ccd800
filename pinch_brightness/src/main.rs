//! pinch_brightness — interactive entry point.

use anyhow::Context;

use pinch_brightness::app::run;
use pinch_brightness::config::AppConfig;
use pinch_brightness::logging::init_logging;

fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Pinch Brightness — hand-gesture display dimmer        ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "camera")]
    println!("  Mode: webcam + MediaPipe");
    #[cfg(not(feature = "camera"))]
    println!("  Mode: Mouse simulation  (use --features camera for a webcam)");
    println!("  Press Q or Escape in the window to quit.");
    println!();

    if let Err(e) = start() {
        tracing::error!("{e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn start() -> anyhow::Result<()> {
    init_logging()?;
    let cfg = AppConfig::from_env().context("reading PINCH_* configuration")?;
    tracing::debug!(?cfg, "configuration");
    run(cfg).context("brightness controller stopped")
}
