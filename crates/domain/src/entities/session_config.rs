//! Typed schema of the host's session configuration object
//!
//! The host hands over a nested, loosely typed object. It is parsed once into
//! these records; range checks on enumerated values happen when the record is
//! translated into an [`EngineConfiguration`](super::EngineConfiguration).
//!
//! ```json
//! {
//!   "traceLevel": 20,
//!   "allowCellular": false,
//!   "refreshModels": false,
//!   "pipeline": { "profile": 0, "sampleRate": 16000, "vadFallDelay": 500 },
//!   "wakeword": { "filter": "https://...", "detect": "https://...", "encode": "https://...", "threshold": 0.9 },
//!   "nlu": { "model": "https://...", "metadata": "https://...", "vocab": "https://...", "inputLength": 128 }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::DomainError;
use crate::entities::NetworkPolicy;
use crate::value_objects::AssetSlot;

/// Root of the host configuration object
///
/// Unknown top-level keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Engine trace verbosity (10, 20, 30 or 100)
    #[serde(
        default,
        deserialize_with = "lenient::option_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub trace_level: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<PipelineSection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wakeword: Option<WakewordSection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nlu: Option<NluSection>,

    /// Permit model downloads over a cellular connection
    #[serde(default)]
    pub allow_cellular: bool,

    /// Re-download models even when a cached copy exists
    #[serde(default)]
    pub refresh_models: bool,
}

impl SessionConfig {
    /// Parse a configuration object from JSON text
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidConfiguration` if the text is not a valid
    /// configuration object.
    pub fn from_json(json: &str) -> Result<Self, DomainError> {
        serde_json::from_str(json).map_err(|e| DomainError::invalid_config("$", e.to_string()))
    }

    /// Parse a configuration object from an already decoded JSON value
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidConfiguration` if the value has the wrong shape.
    pub fn from_value(value: Value) -> Result<Self, DomainError> {
        serde_json::from_value(value).map_err(|e| DomainError::invalid_config("$", e.to_string()))
    }

    /// Download policy derived from `allowCellular` and `refreshModels`
    #[must_use]
    pub const fn network_policy(&self) -> NetworkPolicy {
        NetworkPolicy {
            allow_cellular: self.allow_cellular,
            force_refresh: self.refresh_models,
        }
    }
}

/// `pipeline` section
///
/// Keys other than the recognized ones are kept and forwarded to the engine
/// under their kebab-case name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSection {
    /// Profile index (0 to 5)
    #[serde(
        default,
        deserialize_with = "lenient::option_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub profile: Option<i64>,

    #[serde(
        default,
        deserialize_with = "lenient::option_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub sample_rate: Option<u32>,

    /// Frame width in milliseconds
    #[serde(
        default,
        deserialize_with = "lenient::option_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub frame_width: Option<u32>,

    /// VAD mode (0 to 3)
    #[serde(
        default,
        deserialize_with = "lenient::option_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub vad_mode: Option<i64>,

    /// Milliseconds of silence before voice activity is considered over
    #[serde(
        default,
        deserialize_with = "lenient::option_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub vad_fall_delay: Option<u32>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// `wakeword` section
///
/// `filter`, `detect` and `encode` are model URLs; every other key is a tuning
/// parameter translated by the configuration translator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WakewordSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detect: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encode: Option<String>,

    #[serde(flatten)]
    pub tuning: BTreeMap<String, Value>,
}

impl WakewordSection {
    /// URL supplied for a wake-word slot, if any
    #[must_use]
    pub fn asset_url(&self, slot: AssetSlot) -> Option<&str> {
        match slot {
            AssetSlot::WakewordFilter => self.filter.as_deref(),
            AssetSlot::WakewordDetect => self.detect.as_deref(),
            AssetSlot::WakewordEncode => self.encode.as_deref(),
            _ => None,
        }
    }
}

/// `nlu` section
///
/// Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NluSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocab: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient::option_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub input_length: Option<u32>,
}

impl NluSection {
    /// URL supplied for an NLU slot, if any
    #[must_use]
    pub fn asset_url(&self, slot: AssetSlot) -> Option<&str> {
        match slot {
            AssetSlot::NluModel => self.model.as_deref(),
            AssetSlot::NluMetadata => self.metadata.as_deref(),
            AssetSlot::NluVocab => self.vocab.as_deref(),
            _ => None,
        }
    }
}

/// Hosts written in JavaScript send every number as a double.
mod lenient {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn option_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<Value>::deserialize(deserializer)?
            .map(|value| {
                integral(&value)
                    .ok_or_else(|| D::Error::custom(format!("expected an integer, got {value}")))
            })
            .transpose()
    }

    pub fn option_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        option_i64(deserializer)?
            .map(|n| {
                u32::try_from(n)
                    .map_err(|_| D::Error::custom(format!("expected a non-negative integer, got {n}")))
            })
            .transpose()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn integral(value: &Value) -> Option<i64> {
        value.as_i64().or_else(|| {
            value
                .as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_parses_to_defaults() {
        let config = SessionConfig::from_json("{}").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert!(!config.allow_cellular);
        assert!(!config.refresh_models);
    }

    #[test]
    fn unknown_top_level_keys_are_ignored() {
        let config = SessionConfig::from_json(r#"{"futureOption": {"x": 1}, "traceLevel": 20}"#)
            .unwrap();
        assert_eq!(config.trace_level, Some(20));
    }

    #[test]
    fn doubles_are_accepted_for_integers() {
        let config =
            SessionConfig::from_json(r#"{"pipeline": {"profile": 3.0, "sampleRate": 16000.0}}"#)
                .unwrap();
        let pipeline = config.pipeline.unwrap();
        assert_eq!(pipeline.profile, Some(3));
        assert_eq!(pipeline.sample_rate, Some(16000));
    }

    #[test]
    fn fractional_profile_is_rejected() {
        let err = SessionConfig::from_json(r#"{"pipeline": {"profile": 1.5}}"#).unwrap_err();
        assert!(matches!(err, DomainError::InvalidConfiguration { .. }));
    }

    #[test]
    fn negative_sample_rate_is_rejected() {
        assert!(SessionConfig::from_json(r#"{"pipeline": {"sampleRate": -1}}"#).is_err());
    }

    #[test]
    fn unknown_pipeline_keys_are_preserved() {
        let config =
            SessionConfig::from_json(r#"{"pipeline": {"agcCompressionGainDb": 15}}"#).unwrap();
        let pipeline = config.pipeline.unwrap();
        assert_eq!(
            pipeline.extra.get("agcCompressionGainDb"),
            Some(&serde_json::json!(15))
        );
    }

    #[test]
    fn wakeword_urls_and_tuning_are_split() {
        let config = SessionConfig::from_json(
            r#"{"wakeword": {"filter": "https://m/filter", "threshold": 0.9, "activeMax": 5000}}"#,
        )
        .unwrap();
        let wakeword = config.wakeword.unwrap();
        assert_eq!(
            wakeword.asset_url(AssetSlot::WakewordFilter),
            Some("https://m/filter")
        );
        assert_eq!(wakeword.asset_url(AssetSlot::WakewordDetect), None);
        assert_eq!(wakeword.tuning.len(), 2);
        assert!(!wakeword.tuning.contains_key("filter"));
    }

    #[test]
    fn nlu_unknown_keys_are_dropped() {
        let config = SessionConfig::from_json(
            r#"{"nlu": {"model": "https://m/nlu", "inputLength": 128, "colour": "blue"}}"#,
        )
        .unwrap();
        let nlu = config.nlu.unwrap();
        assert_eq!(nlu.asset_url(AssetSlot::NluModel), Some("https://m/nlu"));
        assert_eq!(nlu.input_length, Some(128));
    }

    #[test]
    fn network_policy_reflects_flags() {
        let config =
            SessionConfig::from_json(r#"{"allowCellular": true, "refreshModels": true}"#).unwrap();
        let policy = config.network_policy();
        assert!(policy.allow_cellular);
        assert!(policy.force_refresh);
    }

    #[test]
    fn from_value_matches_from_json() {
        let value = serde_json::json!({"traceLevel": 10, "nlu": {"vocab": "https://m/v"}});
        let from_value = SessionConfig::from_value(value.clone()).unwrap();
        let from_json = SessionConfig::from_json(&value.to_string()).unwrap();
        assert_eq!(from_value, from_json);
    }
}
