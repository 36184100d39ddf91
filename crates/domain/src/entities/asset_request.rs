//! Asset requests - remote model files to resolve to local paths

use serde::{Deserialize, Serialize};

use crate::value_objects::AssetSlot;

/// Network rules applied while provisioning models
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkPolicy {
    /// Downloads may use a cellular connection
    pub allow_cellular: bool,
    /// Ignore cached copies and download again
    pub force_refresh: bool,
}

/// A model file referenced by the session configuration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetRequest {
    /// Configuration slot the resolved path is written to
    pub slot: AssetSlot,
    /// Remote location of the model
    pub url: String,
}

impl AssetRequest {
    pub fn new(slot: AssetSlot, url: impl Into<String>) -> Self {
        Self {
            slot,
            url: url.into(),
        }
    }

    /// Logical name the model is cached under
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.slot.file_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_slot_file_name() {
        let request = AssetRequest::new(AssetSlot::NluMetadata, "https://models/metadata.json");
        assert_eq!(request.name(), "metadata.json");
        assert_eq!(request.url, "https://models/metadata.json");
    }

    #[test]
    fn default_policy_is_conservative() {
        let policy = NetworkPolicy::default();
        assert!(!policy.allow_cellular);
        assert!(!policy.force_refresh);
    }
}
