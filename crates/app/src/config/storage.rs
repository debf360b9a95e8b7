//! Storage Config

use std::path::PathBuf;

use clap::Args;

/// Local persistence settings.
#[derive(Debug, Clone, Args)]
pub struct StorageConfig {
    /// Directory holding durable state
    #[arg(long, env = "HOMEFIX_DATA_DIR", default_value = ".homefix", global = true)]
    pub data_dir: PathBuf,

    /// Maximum bytes of durable state
    #[arg(long, env = "HOMEFIX_STORAGE_QUOTA", global = true)]
    pub storage_quota: Option<u64>,
}
