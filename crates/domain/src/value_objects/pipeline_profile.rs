//! Pipeline profiles - presets combining a trigger with a recognizer

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// What opens the microphone for recognition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationTrigger {
    Wakeword,
    VoiceActivity,
    PushToTalk,
}

/// Which speech recognizer transcribes the activated audio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recognizer {
    /// The operating system's recognizer
    Platform,
    /// The engine's own cloud recognizer
    Engine,
}

/// Named pipeline preset, selected by index in the session configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineProfile {
    WakewordPlatformAsr,
    VadPlatformAsr,
    #[default]
    PushToTalkPlatformAsr,
    WakewordEngineAsr,
    VadEngineAsr,
    PushToTalkEngineAsr,
}

impl PipelineProfile {
    /// Every profile, ordered by configuration index
    pub const ALL: [Self; 6] = [
        Self::WakewordPlatformAsr,
        Self::VadPlatformAsr,
        Self::PushToTalkPlatformAsr,
        Self::WakewordEngineAsr,
        Self::VadEngineAsr,
        Self::PushToTalkEngineAsr,
    ];

    /// Index used by the host configuration object
    #[must_use]
    pub const fn index(&self) -> i64 {
        match self {
            Self::WakewordPlatformAsr => 0,
            Self::VadPlatformAsr => 1,
            Self::PushToTalkPlatformAsr => 2,
            Self::WakewordEngineAsr => 3,
            Self::VadEngineAsr => 4,
            Self::PushToTalkEngineAsr => 5,
        }
    }

    #[must_use]
    pub const fn trigger(&self) -> ActivationTrigger {
        match self {
            Self::WakewordPlatformAsr | Self::WakewordEngineAsr => ActivationTrigger::Wakeword,
            Self::VadPlatformAsr | Self::VadEngineAsr => ActivationTrigger::VoiceActivity,
            Self::PushToTalkPlatformAsr | Self::PushToTalkEngineAsr => {
                ActivationTrigger::PushToTalk
            },
        }
    }

    #[must_use]
    pub const fn recognizer(&self) -> Recognizer {
        match self {
            Self::WakewordPlatformAsr | Self::VadPlatformAsr | Self::PushToTalkPlatformAsr => {
                Recognizer::Platform
            },
            Self::WakewordEngineAsr | Self::VadEngineAsr | Self::PushToTalkEngineAsr => {
                Recognizer::Engine
            },
        }
    }

    /// Whether this profile needs the wake-word models to trigger
    #[must_use]
    pub const fn uses_wakeword(&self) -> bool {
        matches!(self.trigger(), ActivationTrigger::Wakeword)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::WakewordPlatformAsr => "wakeword_platform_asr",
            Self::VadPlatformAsr => "vad_platform_asr",
            Self::PushToTalkPlatformAsr => "push_to_talk_platform_asr",
            Self::WakewordEngineAsr => "wakeword_engine_asr",
            Self::VadEngineAsr => "vad_engine_asr",
            Self::PushToTalkEngineAsr => "push_to_talk_engine_asr",
        }
    }
}

impl TryFrom<i64> for PipelineProfile {
    type Error = DomainError;

    fn try_from(index: i64) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|profile| profile.index() == index)
            .ok_or_else(|| {
                DomainError::invalid_config(
                    "pipeline.profile",
                    format!("profile index {index} is not one of 0 to 5"),
                )
            })
    }
}

impl fmt::Display for PipelineProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
