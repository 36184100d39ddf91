//! Static network monitor - Connectivity set by the host or configuration

use application::ports::NetworkMonitorPort;
use domain::value_objects::Connectivity;
use parking_lot::RwLock;
use tracing::info;

/// Reports whatever connectivity it was last told
///
/// Hosts with a platform network callback forward changes through [`Self::set`].
#[derive(Debug, Default)]
pub struct StaticNetworkMonitor {
    state: RwLock<Connectivity>,
}

impl StaticNetworkMonitor {
    pub fn new(connectivity: Connectivity) -> Self {
        Self {
            state: RwLock::new(connectivity),
        }
    }

    pub fn set(&self, connectivity: Connectivity) {
        let previous = std::mem::replace(&mut *self.state.write(), connectivity);
        if previous != connectivity {
            info!(from = %previous, to = %connectivity, "Connectivity changed");
        }
    }
}

impl NetworkMonitorPort for StaticNetworkMonitor {
    fn connectivity(&self) -> Connectivity {
        *self.state.read()
    }
}
