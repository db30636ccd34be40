use clap::Parser;
use parking_lot::RwLock;
use std::{
    path::PathBuf,
    sync::{Arc, OnceLock},
};

use super::types::LogLevel;

// -----------------------------------------------------------------------------
// ----- Global Singleton ------------------------------------------------------

static CLI_CONFIG: OnceLock<Arc<RwLock<CliConfig>>> = OnceLock::new();

// -----------------------------------------------------------------------------
// ----- CliConfig -------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct CliConfig {
    pub capture_path: PathBuf,
    pub config_file_location: Option<PathBuf>,
    pub log_level: LogLevel,
}

impl CliConfig {
    pub fn init() {
        CLI_CONFIG.get_or_init(|| Arc::new(RwLock::new(Self::from_args())));
    }

    pub fn snapshot() -> CliConfig {
        handle().read().clone()
    }
}

// -----------------------------------------------------------------------------
// ----- CliConfig: Private ----------------------------------------------------

impl CliConfig {
    fn from_args() -> Self {
        let args = Args::try_parse().unwrap_or_else(|e| e.exit());
        Self::from(args)
    }
}

impl From<Args> for CliConfig {
    fn from(args: Args) -> Self {
        Self {
            capture_path: args.capture,
            config_file_location: args.config_file,
            log_level: args.log_level,
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Args ------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "usbms", version, about = "USB mass storage command dissector")]
struct Args {
    // usbmon capture (link type 189 or 220). Required via CLI or ENV.
    #[arg(env = "USBMS_CAPTURE")]
    capture: PathBuf,

    // Optional device filter / report settings.
    #[arg(long = "config", env = "USBMS_CONFIG_FILE")]
    config_file: Option<PathBuf>,

    // Not required via CLI or ENV (defaults to info).
    #[arg(long = "log", default_value = "info", env = "USBMS_LOG")]
    log_level: LogLevel,
}

// -----------------------------------------------------------------------------
// ----- Private Utils ---------------------------------------------------------

fn handle() -> Arc<RwLock<CliConfig>> {
    CLI_CONFIG
        .get()
        .expect("config not initialized; call Config::init().await first")
        .clone()
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
