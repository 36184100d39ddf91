//! Engine trace verbosity

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// How much the engine reports through trace events
///
/// Lower values are more verbose. Filtering happens inside the engine; the
/// orchestrator forwards every trace event it receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceLevel {
    Debug,
    Perf,
    Info,
    #[default]
    None,
}

impl TraceLevel {
    /// Numeric level understood by the engine
    #[must_use]
    pub const fn value(&self) -> i64 {
        match self {
            Self::Debug => 10,
            Self::Perf => 20,
            Self::Info => 30,
            Self::None => 100,
        }
    }
}

impl TryFrom<i64> for TraceLevel {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            10 => Ok(Self::Debug),
            20 => Ok(Self::Perf),
            30 => Ok(Self::Info),
            100 => Ok(Self::None),
            other => Err(DomainError::invalid_config(
                "traceLevel",
                format!("{other} is not one of 10, 20, 30, 100"),
            )),
        }
    }
}
