//! Application configuration module

use clap::Args;

use crate::config::{backend::BackendConfig, observability::LoggingConfig, storage::StorageConfig};

pub mod backend;
pub mod observability;
pub mod storage;

/// Settings shared by every command, read from flags or the environment.
#[derive(Debug, Clone, Args)]
pub struct AppConfig {
    /// Remote backend settings.
    #[command(flatten)]
    pub backend: BackendConfig,

    /// Local persistence settings.
    #[command(flatten)]
    pub storage: StorageConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}
