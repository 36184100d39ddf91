//! Host bridge port - Outbound notifications to the calling application

use domain::entities::HostNotification;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Transport that emits named events to the host
///
/// Notifications are fire-and-forget; the host never acknowledges them.
#[cfg_attr(test, automock)]
pub trait HostBridgePort: Send + Sync {
    fn emit(&self, notification: &HostNotification) -> Result<(), ApplicationError>;
}
