//! Asset provisioning - Resolves model URLs to local files
//!
//! Each request is served from the cache when possible, otherwise downloaded
//! under the session's network policy. A batch of requests runs concurrently
//! and is cancelled as a whole on the first failure.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use domain::entities::{AssetRequest, NetworkPolicy};
use domain::value_objects::{AssetSlot, Connectivity};
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use crate::error::ApplicationError;
use crate::ports::{ModelCachePort, ModelDownloaderPort, NetworkMonitorPort};

/// Count of asset requests not yet resolved
///
/// Only ever decremented, once per resolution, and never below zero.
#[derive(Debug)]
pub struct ProvisioningProgress {
    total: usize,
    remaining: AtomicUsize,
}

impl ProvisioningProgress {
    pub const fn new(total: usize) -> Self {
        Self {
            total,
            remaining: AtomicUsize::new(total),
        }
    }

    pub const fn total(&self) -> usize {
        self.total
    }

    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }

    pub fn is_complete(&self) -> bool {
        self.remaining() == 0
    }

    /// Record one resolution and return the new remaining count
    ///
    /// Returns `None` if every request was already resolved.
    pub fn resolve_one(&self) -> Option<usize> {
        self.remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .ok()
            .map(|previous| previous - 1)
    }
}

/// A model file resolved to a local path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedAsset {
    pub slot: AssetSlot,
    pub path: PathBuf,
}

/// Service resolving asset requests through the cache and the downloader
#[derive(Clone)]
pub struct AssetProvisioner {
    cache: Arc<dyn ModelCachePort>,
    downloader: Arc<dyn ModelDownloaderPort>,
    network: Arc<dyn NetworkMonitorPort>,
}

impl fmt::Debug for AssetProvisioner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetProvisioner").finish_non_exhaustive()
    }
}

impl AssetProvisioner {
    pub fn new(
        cache: Arc<dyn ModelCachePort>,
        downloader: Arc<dyn ModelDownloaderPort>,
        network: Arc<dyn NetworkMonitorPort>,
    ) -> Self {
        Self {
            cache,
            downloader,
            network,
        }
    }

    /// Resolve one request to a local path
    ///
    /// A cached copy is returned without touching the network unless
    /// `policy.force_refresh` is set.
    #[instrument(skip(self, request), fields(name = request.name(), url = %request.url))]
    pub async fn provision(
        &self,
        request: &AssetRequest,
        policy: NetworkPolicy,
    ) -> Result<PathBuf, ApplicationError> {
        if !policy.force_refresh {
            if let Some(path) = self.cache.lookup(request.name()).await? {
                debug!(path = %path.display(), "Using cached model");
                return Ok(path);
            }
        }

        self.check_network(policy)?;

        let contents = self.downloader.fetch(&request.url).await?;
        let path = self.cache.store(request.name(), &contents).await?;
        info!(
            path = %path.display(),
            bytes = contents.len(),
            "Downloaded model"
        );
        Ok(path)
    }

    /// Resolve every request concurrently
    ///
    /// Completes once all requests are resolved, in whatever order they finish.
    /// The first failure aborts the remaining downloads and is returned.
    #[instrument(skip(self, requests), fields(count = requests.len()))]
    pub async fn provision_all(
        &self,
        requests: Vec<AssetRequest>,
        policy: NetworkPolicy,
    ) -> Result<Vec<ProvisionedAsset>, ApplicationError> {
        let progress = ProvisioningProgress::new(requests.len());
        let mut tasks = JoinSet::new();

        for request in requests {
            let provisioner = self.clone();
            tasks.spawn(async move {
                let result = provisioner.provision(&request, policy).await;
                (request.slot, result)
            });
        }

        let mut provisioned = Vec::with_capacity(progress.total());
        while let Some(joined) = tasks.join_next().await {
            let outcome = joined
                .map_err(|e| ApplicationError::Internal(format!("Provisioning task failed: {e}")))
                .and_then(|(slot, result)| result.map(|path| ProvisionedAsset { slot, path }));

            match outcome {
                Ok(asset) => {
                    let remaining = progress.resolve_one().unwrap_or_default();
                    debug!(slot = %asset.slot, remaining, "Model resolved");
                    provisioned.push(asset);
                },
                Err(e) => {
                    warn!(error = %e, "Model provisioning failed, cancelling remaining downloads");
                    tasks.abort_all();
                    return Err(e);
                },
            }
        }

        if !progress.is_complete() {
            return Err(ApplicationError::Internal(format!(
                "{} of {} models unresolved",
                progress.remaining(),
                progress.total()
            )));
        }

        Ok(provisioned)
    }

    fn check_network(&self, policy: NetworkPolicy) -> Result<(), ApplicationError> {
        match self.network.connectivity() {
            Connectivity::Wifi => Ok(()),
            Connectivity::Cellular if policy.allow_cellular => Ok(()),
            Connectivity::Cellular => Err(ApplicationError::NetworkUnavailable(
                "only a cellular connection is available and cellular downloads are disabled"
                    .to_string(),
            )),
            Connectivity::Offline => Err(ApplicationError::NetworkUnavailable(
                "no network connection".to_string(),
            )),
            Connectivity::Unknown => Err(ApplicationError::NetworkStatusUnavailable),
        }
    }
}
