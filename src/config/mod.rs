//! Configuration Module

mod loader;
mod types;

pub use loader::{load_config, load_config_from_path, print_config, ConfigError};
pub use types::{
    AppConfig, DatabaseConfig, LogConfig, ServerConfig, SpeechConfig, StorageConfig, WorkerConfig,
};
