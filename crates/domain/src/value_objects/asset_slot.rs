//! Asset slots - the model files a pipeline feature needs

use std::fmt;

use serde::{Deserialize, Serialize};

/// Optional pipeline capability backed by downloaded models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Wakeword,
    Nlu,
}

impl Feature {
    /// The three slots that must all be supplied to enable this feature
    #[must_use]
    pub const fn slots(&self) -> [AssetSlot; 3] {
        match self {
            Self::Wakeword => [
                AssetSlot::WakewordFilter,
                AssetSlot::WakewordDetect,
                AssetSlot::WakewordEncode,
            ],
            Self::Nlu => [
                AssetSlot::NluModel,
                AssetSlot::NluMetadata,
                AssetSlot::NluVocab,
            ],
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wakeword => write!(f, "wakeword"),
            Self::Nlu => write!(f, "nlu"),
        }
    }
}

/// A model file position in the engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetSlot {
    WakewordFilter,
    WakewordDetect,
    WakewordEncode,
    NluModel,
    NluMetadata,
    NluVocab,
}

impl AssetSlot {
    pub const ALL: [Self; 6] = [
        Self::WakewordFilter,
        Self::WakewordDetect,
        Self::WakewordEncode,
        Self::NluModel,
        Self::NluMetadata,
        Self::NluVocab,
    ];

    /// Local file name; also the cache key
    #[must_use]
    pub const fn file_name(&self) -> &'static str {
        match self {
            Self::WakewordFilter => "filter.tflite",
            Self::WakewordDetect => "detect.tflite",
            Self::WakewordEncode => "encode.tflite",
            Self::NluModel => "nlu.tflite",
            Self::NluMetadata => "metadata.json",
            Self::NluVocab => "vocab.txt",
        }
    }

    /// Engine property that receives the resolved local path
    #[must_use]
    pub const fn property_name(&self) -> &'static str {
        match self {
            Self::WakewordFilter => "wake-filter-path",
            Self::WakewordDetect => "wake-detect-path",
            Self::WakewordEncode => "wake-encode-path",
            Self::NluModel => "nlu-model-path",
            Self::NluMetadata => "nlu-metadata-path",
            Self::NluVocab => "wordpiece-vocab-path",
        }
    }

    /// Key under the `wakeword` or `nlu` section of the session configuration
    #[must_use]
    pub const fn config_key(&self) -> &'static str {
        match self {
            Self::WakewordFilter => "filter",
            Self::WakewordDetect => "detect",
            Self::WakewordEncode => "encode",
            Self::NluModel => "model",
            Self::NluMetadata => "metadata",
            Self::NluVocab => "vocab",
        }
    }

    #[must_use]
    pub const fn feature(&self) -> Feature {
        match self {
            Self::WakewordFilter | Self::WakewordDetect | Self::WakewordEncode => {
                Feature::Wakeword
            },
            Self::NluModel | Self::NluMetadata | Self::NluVocab => Feature::Nlu,
        }
    }
}

impl fmt::Display for AssetSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.feature(), self.config_key())
    }
}
