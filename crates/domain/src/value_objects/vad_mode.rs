//! Voice activity detection aggressiveness

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// How eagerly the voice activity detector classifies audio as speech
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VadMode {
    #[default]
    HighlyPermissive,
    Permissive,
    Aggressive,
    VeryAggressive,
}

impl VadMode {
    #[must_use]
    pub const fn value(&self) -> i64 {
        match self {
            Self::HighlyPermissive => 0,
            Self::Permissive => 1,
            Self::Aggressive => 2,
            Self::VeryAggressive => 3,
        }
    }
}

impl TryFrom<i64> for VadMode {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::HighlyPermissive),
            1 => Ok(Self::Permissive),
            2 => Ok(Self::Aggressive),
            3 => Ok(Self::VeryAggressive),
            other => Err(DomainError::invalid_config(
                "pipeline.vadMode",
                format!("{other} is not one of 0 to 3"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_roundtrip() {
        for value in 0..=3 {
            assert_eq!(VadMode::try_from(value).unwrap().value(), value);
        }
    }

    #[test]
    fn out_of_range_rejected() {
        assert!(VadMode::try_from(4).is_err());
    }
}
