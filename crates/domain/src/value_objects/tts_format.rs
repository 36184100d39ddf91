//! Text-to-speech input formats

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Markup flavour of the text handed to the synthesizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TtsFormat {
    #[default]
    Text,
    Ssml,
    SpeechMarkdown,
}

impl TtsFormat {
    /// Integer code used by the host calling convention
    #[must_use]
    pub const fn code(&self) -> i64 {
        match self {
            Self::Text => 0,
            Self::Ssml => 1,
            Self::SpeechMarkdown => 2,
        }
    }
}

impl TryFrom<i64> for TtsFormat {
    type Error = DomainError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Text),
            1 => Ok(Self::Ssml),
            2 => Ok(Self::SpeechMarkdown),
            other => Err(DomainError::InvalidArgument(format!(
                "A format of {other} is not supported. Use an integer from 0 to 2."
            ))),
        }
    }
}

impl fmt::Display for TtsFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Ssml => write!(f, "ssml"),
            Self::SpeechMarkdown => write!(f, "speech_markdown"),
        }
    }
}
