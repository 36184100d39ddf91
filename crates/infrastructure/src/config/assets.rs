//! Model asset settings: cache location, download limits, connectivity.

use std::path::PathBuf;
use std::time::Duration;

use domain::value_objects::Connectivity;
use serde::{Deserialize, Serialize};

/// Where model files are cached and how they are downloaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Directory holding downloaded model files
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Per-download timeout in seconds (default: 60)
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,

    /// Largest model file accepted, in bytes (default: 256 MiB)
    #[serde(default = "default_max_model_bytes")]
    pub max_model_bytes: u64,

    /// Connectivity reported to the provisioner
    ///
    /// A host without a platform network monitor states it here.
    #[serde(default)]
    pub connectivity: Connectivity,
}

/// Platform cache directory, falling back to the system temp directory
fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("speechbridge")
        .join("models")
}

const fn default_download_timeout() -> u64 {
    60
}

const fn default_max_model_bytes() -> u64 {
    256 * 1024 * 1024
}

impl AssetsConfig {
    pub const fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            download_timeout_secs: default_download_timeout(),
            max_model_bytes: default_max_model_bytes(),
            connectivity: Connectivity::default(),
        }
    }
}
