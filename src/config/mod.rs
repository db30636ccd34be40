pub mod cli;
pub mod config;
pub mod filter;
pub mod types;

pub use config::Config;
pub use filter::{ConfigError, FilterConfig};
pub use types::LogLevel;
