use parking_lot::RwLock;
use tracing::warn;
use std::{
    path::PathBuf,
    sync::{Arc, OnceLock},
};

use super::{
    cli::CliConfig,
    filter::{ConfigError, FilterConfig},
    types::LogLevel,
};

// -----------------------------------------------------------------------------
// ----- Global Singleton ------------------------------------------------------

static ROOT_CONFIG: OnceLock<Arc<RwLock<Config>>> = OnceLock::new();

// -----------------------------------------------------------------------------
// ----- Config ----------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct Config {
    pub capture_path: PathBuf,
    pub log_level: LogLevel,
    pub filter: FilterConfig,
}

// -----------------------------------------------------------------------------
// ----- Config: Static --------------------------------------------------------

impl Config {
    /// Async because the filter file is read with non-blocking IO.
    pub async fn init() -> Result<(), ConfigError> {
        CliConfig::init();

        Self::load().await
    }

    pub fn snapshot() -> Config {
        Self::handle().read().clone()
    }
}

// -----------------------------------------------------------------------------
// ----- Config: Private -------------------------------------------------------

impl Config {
    async fn load() -> Result<(), ConfigError> {
        let cli = CliConfig::snapshot();

        let filter = match cli.config_file_location.as_deref() {
            Some(path) => FilterConfig::from_file(path).await?,
            None => FilterConfig::default(),
        };

        let next = Config {
            capture_path: cli.capture_path,
            log_level: cli.log_level,
            filter,
        };

        if ROOT_CONFIG.set(Arc::new(RwLock::new(next))).is_err() {
            warn!("Config::init called twice; keeping the first config");
        }

        Ok(())
    }

    fn handle() -> Arc<RwLock<Config>> {
        ROOT_CONFIG
            .get()
            .expect("Config not initialized; call Config::init().await first")
            .clone()
    }
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
