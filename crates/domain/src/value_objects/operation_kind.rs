//! Operation kinds - the classes of caller request a session tracks

use std::fmt;

use serde::{Deserialize, Serialize};

/// Tag identifying a class of caller request
///
/// At most one request per kind can be outstanding in a session at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Initialize,
    Start,
    Stop,
    Activate,
    Deactivate,
    Synthesize,
    Speak,
    Classify,
}

impl OperationKind {
    /// Every operation kind, in declaration order
    pub const ALL: [Self; 8] = [
        Self::Initialize,
        Self::Start,
        Self::Stop,
        Self::Activate,
        Self::Deactivate,
        Self::Synthesize,
        Self::Speak,
        Self::Classify,
    ];

    /// Lowercase name used in logs and error codes
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Activate => "activate",
            Self::Deactivate => "deactivate",
            Self::Synthesize => "synthesize",
            Self::Speak => "speak",
            Self::Classify => "classify",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_serde_name() {
        for kind in OperationKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }

    #[test]
    fn all_kinds_are_distinct() {
        let unique: std::collections::HashSet<_> = OperationKind::ALL.iter().collect();
        assert_eq!(unique.len(), OperationKind::ALL.len());
    }
}
