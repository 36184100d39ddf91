//! Notification publisher - Mirrors every engine event to the host

use std::fmt;
use std::sync::Arc;

use domain::entities::{EngineEvent, HostNotification};
use tracing::{trace, warn};

use crate::ports::HostBridgePort;

/// Publishes one host notification per engine event
///
/// Emission is unconditional; it does not depend on pending requests.
pub struct NotificationPublisher {
    bridge: Arc<dyn HostBridgePort>,
}

impl fmt::Debug for NotificationPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationPublisher").finish_non_exhaustive()
    }
}

impl NotificationPublisher {
    pub fn new(bridge: Arc<dyn HostBridgePort>) -> Self {
        Self { bridge }
    }

    pub fn publish(&self, event: &EngineEvent) {
        let notification = HostNotification::from(event);
        trace!(name = notification.name(), "Emitting host notification");
        if let Err(e) = self.bridge.emit(&notification) {
            warn!(error = %e, name = notification.name(), "Failed to emit host notification");
        }
    }
}
