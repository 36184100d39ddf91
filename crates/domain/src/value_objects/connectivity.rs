//! Network connectivity as reported by the platform

use std::fmt;

use serde::{Deserialize, Serialize};

/// Current network path available for model downloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    #[default]
    Wifi,
    /// Metered mobile data only
    Cellular,
    Offline,
    /// The platform has not reported a status yet
    Unknown,
}

impl Connectivity {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Wifi => "wifi",
            Self::Cellular => "cellular",
            Self::Offline => "offline",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
