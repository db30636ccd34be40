use serde::Deserialize;
use smallvec::SmallVec;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

use crate::shared_types::UsbAddress;

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

const SMALLVEC_SIZE: usize = 8;

// -----------------------------------------------------------------------------
// ----- FilterConfig ----------------------------------------------------------

/// What the capture pipeline looks at, loaded from `usbms.toml`.
///
/// ```toml
/// report_commands = true
///
/// [[devices]]
/// bus = 2
/// device = 4
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterConfig {
    /// Devices to dissect. Empty means every device in the capture.
    pub devices: SmallVec<[UsbAddress; SMALLVEC_SIZE]>,
    /// Keep a per-command log for the final report.
    pub report_commands: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {source}")]
    Toml {
        #[source]
        source: toml::de::Error,
    },

    #[error("device {0} listed twice")]
    DuplicateDevice(UsbAddress),
}

// -----------------------------------------------------------------------------
// ----- FilterConfig: Static --------------------------------------------------

impl FilterConfig {
    pub async fn from_file(path: &Path) -> Result<FilterConfig, ConfigError> {
        let raw = fs::read_to_string(path).await.map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<FilterConfig, ConfigError> {
        let doc: FilterFile = toml::from_str(raw).map_err(|e| ConfigError::Toml { source: e })?;

        let mut devices: SmallVec<[UsbAddress; SMALLVEC_SIZE]> = SmallVec::new();
        for device in doc.devices {
            if devices.contains(&device) {
                return Err(ConfigError::DuplicateDevice(device));
            }
            devices.push(device);
        }

        Ok(FilterConfig {
            devices,
            report_commands: doc.report_commands,
        })
    }
}

// -----------------------------------------------------------------------------
// ----- FilterConfig: Public --------------------------------------------------

impl FilterConfig {
    pub fn allows(&self, address: UsbAddress) -> bool {
        self.devices.is_empty() || self.devices.contains(&address)
    }
}

// -----------------------------------------------------------------------------
// ----- Internal: File --------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FilterFile {
    #[serde(default)]
    devices: Vec<UsbAddress>,
    #[serde(default)]
    report_commands: bool,
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
