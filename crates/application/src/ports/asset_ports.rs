//! Asset ports - Model cache, downloader and network status

use std::path::PathBuf;

use async_trait::async_trait;
use domain::value_objects::Connectivity;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Local store of downloaded model files, keyed by file name
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ModelCachePort: Send + Sync {
    /// Path of a previously stored copy of `name`, if one exists
    async fn lookup(&self, name: &str) -> Result<Option<PathBuf>, ApplicationError>;

    /// Store `contents` under `name`, replacing any previous copy
    ///
    /// # Returns
    /// The local path of the stored file
    async fn store(&self, name: &str, contents: &[u8]) -> Result<PathBuf, ApplicationError>;
}

/// Fetches remote model files
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ModelDownloaderPort: Send + Sync {
    /// Download the resource at `url`
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ApplicationError>;
}

/// Reports which network path is currently available
#[cfg_attr(test, automock)]
pub trait NetworkMonitorPort: Send + Sync {
    fn connectivity(&self) -> Connectivity;
}
