use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use usbms::{Config, analytics, dissect_capture};

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

const APP_NAME: &str = "🔌 usbms";

// -----------------------------------------------------------------------------
// ----- Main ------------------------------------------------------------------

#[tokio::main]
async fn main() -> std::io::Result<()> {
    setup().await?;
    run().await
}

// -----------------------------------------------------------------------------
// ----- Setup -----------------------------------------------------------------

async fn setup() -> std::io::Result<()> {
    // Has to come first: tracing reads the log level from the config
    Config::init().await.map_err(std::io::Error::other)?;

    init_tracing()
}

fn init_tracing() -> std::io::Result<()> {
    let config = Config::snapshot();
    let filter = EnvFilter::try_new(config.log_level.directive()).map_err(std::io::Error::other)?;
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
    Ok(())
}

// -----------------------------------------------------------------------------
// ----- Run -------------------------------------------------------------------

async fn run() -> std::io::Result<()> {
    let config = Config::snapshot();
    let stop = Arc::new(AtomicBool::new(false));

    info!("{} reading {}", APP_NAME, config.capture_path.display());

    let worker_stop = stop.clone();
    let mut worker = tokio::task::spawn_blocking(move || {
        dissect_capture(&config.capture_path, config.filter, &worker_stop)
    });

    let joined = tokio::select! {
        joined = &mut worker => joined,

        _ = signal::ctrl_c() => {
            warn!("{} interrupted, finishing current frame", APP_NAME);
            stop.store(true, Ordering::Relaxed);
            worker.await
        }
    };

    let result = joined.map_err(std::io::Error::other)?;

    match result {
        Ok(report) => {
            print!("{report}");

            let stats = analytics::snapshot();
            info!(
                captures = stats.captures,
                frames = stats.frames,
                "{} done",
                APP_NAME
            );
            Ok(())
        }
        Err(e) => {
            error!("dissection failed: {e}");
            Err(std::io::Error::other(e))
        }
    }
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
