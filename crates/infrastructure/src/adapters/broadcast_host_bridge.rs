//! Broadcast host bridge - Fans notifications out to in-process subscribers

use application::error::ApplicationError;
use application::ports::HostBridgePort;
use domain::entities::HostNotification;
use tokio::sync::broadcast;
use tracing::trace;

/// Host bridge backed by a Tokio broadcast channel
///
/// A subscriber that falls more than `capacity` notifications behind skips
/// the oldest ones.
#[derive(Debug, Clone)]
pub struct BroadcastHostBridge {
    sender: broadcast::Sender<HostNotification>,
}

impl BroadcastHostBridge {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HostNotification> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastHostBridge {
    fn default() -> Self {
        Self::new(64)
    }
}

impl HostBridgePort for BroadcastHostBridge {
    fn emit(&self, notification: &HostNotification) -> Result<(), ApplicationError> {
        // No subscriber is not an error: notifications are fire-and-forget
        match self.sender.send(notification.clone()) {
            Ok(receivers) => trace!(event = notification.name(), receivers, "Notification sent"),
            Err(_) => trace!(event = notification.name(), "No subscribers"),
        }
        Ok(())
    }
}
