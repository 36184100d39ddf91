//! Session behaviour settings.

use application::services::{DuplicateRequestPolicy, SessionOptions};
use serde::{Deserialize, Serialize};

/// Options applied to every speech session the host creates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionAppConfig {
    /// Handling of a request issued while one of the same kind is pending
    #[serde(default)]
    pub duplicate_requests: DuplicateRequestPolicy,
}

impl From<&SessionAppConfig> for SessionOptions {
    fn from(config: &SessionAppConfig) -> Self {
        Self {
            duplicate_requests: config.duplicate_requests,
        }
    }
}
