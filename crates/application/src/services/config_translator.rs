//! Configuration translator - Host configuration to engine configuration
//!
//! Maps the nested session configuration into an [`EngineConfiguration`], the
//! feature toggles and the model asset requests. No asset is resolved here.

use std::collections::BTreeMap;

use domain::DomainError;
use domain::entities::{
    AssetRequest, EngineConfiguration, FeatureSet, NetworkPolicy, PipelineSection,
    SessionConfig, WakewordParameters,
};
use domain::value_objects::{Credentials, Feature, PipelineProfile, TraceLevel, VadMode};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error::ApplicationError;

/// FFT window used by the wake-word detector unless the host names one
const DEFAULT_FFT_WINDOW_TYPE: &str = "hann";

/// Result of translating a session configuration
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedConfig {
    /// Engine configuration without model paths
    pub configuration: EngineConfiguration,
    /// Features whose three model slots were all supplied
    pub features: FeatureSet,
    /// One request per model slot of each enabled feature
    pub asset_requests: Vec<AssetRequest>,
    pub network_policy: NetworkPolicy,
}

/// Stateless translator from [`SessionConfig`] to [`TranslatedConfig`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigTranslator;

impl ConfigTranslator {
    pub const fn new() -> Self {
        Self
    }

    /// Translate a session configuration
    ///
    /// A feature with fewer than three model URLs is disabled, never an error.
    /// Out-of-range enumerated values are rejected.
    #[instrument(skip(self, credentials, config), fields(client_id = %credentials.client_id()))]
    pub fn translate(
        &self,
        credentials: Credentials,
        config: &SessionConfig,
    ) -> Result<TranslatedConfig, ApplicationError> {
        let mut configuration = EngineConfiguration::new(credentials);

        if let Some(level) = config.trace_level {
            configuration.trace_level = TraceLevel::try_from(level)?;
        }

        if let Some(pipeline) = &config.pipeline {
            apply_pipeline(&mut configuration, pipeline)?;
        }

        if let Some(wakeword) = &config.wakeword {
            for (key, value) in &wakeword.tuning {
                apply_wakeword_key(&mut configuration, key, value)?;
            }
        }

        if let Some(length) = config.nlu.as_ref().and_then(|nlu| nlu.input_length) {
            configuration.nlu_input_length = Some(length);
        }

        let mut asset_requests = Vec::new();
        let features = FeatureSet {
            wakeword: collect_requests(Feature::Wakeword, config, &mut asset_requests),
            nlu: collect_requests(Feature::Nlu, config, &mut asset_requests),
        };

        if features.wakeword && configuration.wakeword.fft_window_type.is_none() {
            configuration.wakeword.fft_window_type = Some(DEFAULT_FFT_WINDOW_TYPE.to_string());
        }

        if configuration.profile.uses_wakeword() && !features.wakeword {
            warn!(
                profile = %configuration.profile,
                "Wake-word profile selected without wake-word models"
            );
        }

        debug!(
            profile = %configuration.profile,
            wakeword = features.wakeword,
            nlu = features.nlu,
            assets = asset_requests.len(),
            "Translated session configuration"
        );

        Ok(TranslatedConfig {
            configuration,
            features,
            asset_requests,
            network_policy: config.network_policy(),
        })
    }
}

fn apply_pipeline(
    configuration: &mut EngineConfiguration,
    pipeline: &PipelineSection,
) -> Result<(), ApplicationError> {
    // Extras first so that recognized keys win on a name clash
    for (key, value) in pipeline.extra.iter().filter(|(_, value)| !value.is_null()) {
        configuration
            .extra_properties
            .insert(kebab_case(key), value.clone());
    }
    if let Some(index) = pipeline.profile {
        configuration.profile = PipelineProfile::try_from(index)?;
    }
    if let Some(mode) = pipeline.vad_mode {
        configuration.vad_mode = Some(VadMode::try_from(mode)?);
    }
    configuration.sample_rate = pipeline.sample_rate;
    configuration.frame_width = pipeline.frame_width;
    configuration.vad_fall_delay = pipeline.vad_fall_delay;
    Ok(())
}

fn apply_wakeword_key(
    configuration: &mut EngineConfiguration,
    key: &str,
    value: &Value,
) -> Result<(), ApplicationError> {
    if value.is_null() {
        return Ok(());
    }
    let params: &mut WakewordParameters = &mut configuration.wakeword;
    match key {
        "activeMin" => params.active_min = Some(as_u32(key, value)?),
        "activeMax" => params.active_max = Some(as_u32(key, value)?),
        "encodeLength" => params.encode_length = Some(as_u32(key, value)?),
        "encodeWidth" => params.encode_width = Some(as_u32(key, value)?),
        "stateWidth" => params.state_width = Some(as_u32(key, value)?),
        "threshold" => params.threshold = Some(as_f32(key, value)?),
        "wakewords" => params.wakewords = Some(as_keyword_list(key, value)?),
        "requestTimeout" => params.request_timeout = Some(as_u32(key, value)?),
        "rmsTarget" => params.rms_target = Some(as_f32(key, value)?),
        "rmsAlpha" => params.rms_alpha = Some(as_f32(key, value)?),
        "fftWindowSize" => params.fft_window_size = Some(as_u32(key, value)?),
        "fftWindowType" => params.fft_window_type = Some(as_string(key, value)?),
        "fftHopLength" => params.fft_hop_length = Some(as_u32(key, value)?),
        "preEmphasis" => params.pre_emphasis = Some(as_f32(key, value)?),
        "melFrameLength" => params.mel_frame_length = Some(as_u32(key, value)?),
        "melFrameWidth" => params.mel_frame_width = Some(as_u32(key, value)?),
        _ => {
            configuration
                .extra_properties
                .insert(kebab_case(key), value.clone());
        },
    }
    Ok(())
}

/// Push the feature's requests if all three slots were supplied
fn collect_requests(
    feature: Feature,
    config: &SessionConfig,
    requests: &mut Vec<AssetRequest>,
) -> bool {
    let urls = feature.slots().map(|slot| {
        let url = match feature {
            Feature::Wakeword => config
                .wakeword
                .as_ref()
                .and_then(|section| section.asset_url(slot)),
            Feature::Nlu => config
                .nlu
                .as_ref()
                .and_then(|section| section.asset_url(slot)),
        };
        (slot, url.filter(|url| !url.trim().is_empty()))
    });

    let supplied = urls.iter().filter(|(_, url)| url.is_some()).count();
    if supplied != urls.len() {
        debug!(
            feature = %feature,
            supplied,
            "Not enough model files, building without feature"
        );
        return false;
    }

    requests.extend(
        urls.into_iter()
            .filter_map(|(slot, url)| url.map(|url| AssetRequest::new(slot, url))),
    );
    true
}

/// `camelCase` to `kebab-case`, splitting only at a lowercase-uppercase boundary
pub fn kebab_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut previous_lower = false;
    for ch in key.chars() {
        if previous_lower && ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
        previous_lower = ch.is_ascii_lowercase();
    }
    out
}

fn wakeword_error(key: &str, reason: &str) -> ApplicationError {
    DomainError::invalid_config(format!("wakeword.{key}"), reason).into()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn as_u32(key: &str, value: &Value) -> Result<u32, ApplicationError> {
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .or_else(|| {
            value
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= f64::from(u32::MAX))
                .map(|f| f as u32)
        })
        .ok_or_else(|| wakeword_error(key, "expected a non-negative integer"))
}

#[allow(clippy::cast_possible_truncation)]
fn as_f32(key: &str, value: &Value) -> Result<f32, ApplicationError> {
    value
        .as_f64()
        .map(|f| f as f32)
        .ok_or_else(|| wakeword_error(key, "expected a number"))
}

fn as_string(key: &str, value: &Value) -> Result<String, ApplicationError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| wakeword_error(key, "expected a string"))
}

/// Accepts either a comma-separated string or an array of strings
fn as_keyword_list(key: &str, value: &Value) -> Result<String, ApplicationError> {
    match value {
        Value::String(list) => Ok(list.clone()),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .map(|words| words.join(","))
            .ok_or_else(|| wakeword_error(key, "expected a list of strings")),
        _ => Err(wakeword_error(key, "expected a string or a list of strings")),
    }
}

#[cfg(test)]
mod tests {
    use domain::value_objects::AssetSlot;
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    fn credentials() -> Credentials {
        Credentials::new("client", "secret").unwrap()
    }

    fn translate(config: Value) -> Result<TranslatedConfig, ApplicationError> {
        let config = SessionConfig::from_value(config).unwrap();
        ConfigTranslator::new().translate(credentials(), &config)
    }

    fn full_wakeword() -> Value {
        json!({
            "filter": "https://models/filter.tflite",
            "detect": "https://models/detect.tflite",
            "encode": "https://models/encode.tflite",
        })
    }

    #[test]
    fn empty_config_uses_defaults() {
        let translated = translate(json!({})).unwrap();
        assert_eq!(
            translated.configuration.profile,
            PipelineProfile::PushToTalkPlatformAsr
        );
        assert_eq!(translated.configuration.trace_level, TraceLevel::None);
        assert_eq!(translated.features, FeatureSet::default());
        assert!(translated.asset_requests.is_empty());
    }

    #[test]
    fn explicit_profile_overrides_default() {
        let translated = translate(json!({"pipeline": {"profile": 4}})).unwrap();
        assert_eq!(
            translated.configuration.profile,
            PipelineProfile::VadEngineAsr
        );
    }

    #[test]
    fn out_of_range_profile_is_rejected() {
        let err = translate(json!({"pipeline": {"profile": 6}})).unwrap_err();
        assert_eq!(err.code(), "invalid_configuration");
    }

    #[test]
    fn invalid_vad_mode_and_trace_level_are_rejected() {
        assert!(translate(json!({"pipeline": {"vadMode": 4}})).is_err());
        assert!(translate(json!({"traceLevel": 15})).is_err());
    }

    #[test]
    fn pipeline_values_are_copied() {
        let translated = translate(json!({
            "traceLevel": 20,
            "pipeline": {"sampleRate": 16000, "frameWidth": 20, "vadMode": 2, "vadFallDelay": 500}
        }))
        .unwrap();
        let configuration = translated.configuration;
        assert_eq!(configuration.trace_level, TraceLevel::Perf);
        assert_eq!(configuration.sample_rate, Some(16000));
        assert_eq!(configuration.frame_width, Some(20));
        assert_eq!(configuration.vad_mode, Some(VadMode::Aggressive));
        assert_eq!(configuration.vad_fall_delay, Some(500));
    }

    #[test]
    fn unknown_pipeline_keys_fall_back_to_kebab_case() {
        let translated = translate(json!({"pipeline": {"agcTargetLevelDbfs": 3}})).unwrap();
        assert_eq!(
            translated
                .configuration
                .extra_properties
                .get("agc-target-level-dbfs"),
            Some(&json!(3))
        );
    }

    #[test]
    fn fewer_than_three_wakeword_urls_disable_wakeword() {
        let translated = translate(json!({
            "wakeword": {
                "filter": "https://models/filter.tflite",
                "detect": "https://models/detect.tflite",
            }
        }))
        .unwrap();
        assert!(!translated.features.wakeword);
        assert!(translated.asset_requests.is_empty());
    }

    #[test]
    fn three_wakeword_urls_enable_wakeword() {
        let translated = translate(json!({"wakeword": full_wakeword()})).unwrap();
        assert!(translated.features.wakeword);
        assert!(!translated.features.nlu);
        let slots: Vec<_> = translated.asset_requests.iter().map(|r| r.slot).collect();
        assert_eq!(slots, Feature::Wakeword.slots().to_vec());
        assert_eq!(translated.asset_requests[0].name(), "filter.tflite");
    }

    #[test]
    fn blank_url_does_not_count_as_supplied() {
        let mut wakeword = full_wakeword();
        wakeword["encode"] = json!("  ");
        let translated = translate(json!({ "wakeword": wakeword })).unwrap();
        assert!(!translated.features.wakeword);
    }

    #[test]
    fn nlu_requires_model_metadata_and_vocab() {
        let translated = translate(json!({
            "nlu": {
                "model": "https://models/nlu.tflite",
                "metadata": "https://models/metadata.json",
                "vocab": "https://models/vocab.txt",
                "inputLength": 128,
            }
        }))
        .unwrap();
        assert!(translated.features.nlu);
        assert_eq!(translated.configuration.nlu_input_length, Some(128));
        assert!(
            translated
                .asset_requests
                .iter()
                .any(|r| r.slot == AssetSlot::NluVocab && r.url == "https://models/vocab.txt")
        );
    }

    #[test]
    fn wakeword_table_takes_precedence_over_fallback() {
        let translated = translate(json!({
            "wakeword": {"activeMin": 500, "threshold": 0.5, "fftWindowType": "hann", "customKnob": 7}
        }))
        .unwrap();
        let configuration = translated.configuration;
        assert_eq!(configuration.wakeword.active_min, Some(500));
        assert_eq!(configuration.wakeword.threshold, Some(0.5));
        assert_eq!(
            configuration.wakeword.fft_window_type.as_deref(),
            Some("hann")
        );
        assert!(!configuration.extra_properties.contains_key("active-min"));
        assert_eq!(
            configuration.extra_properties.get("custom-knob"),
            Some(&json!(7))
        );
    }

    #[test]
    fn fft_window_defaults_to_hann_with_wakeword() {
        let translated = translate(json!({"wakeword": full_wakeword()})).unwrap();
        assert!(translated.features.wakeword);
        assert_eq!(
            translated.configuration.properties().get("fft-window-type"),
            Some(&json!("hann"))
        );

        let mut custom = full_wakeword();
        custom["fftWindowType"] = json!("hamming");
        let translated = translate(json!({"wakeword": custom})).unwrap();
        assert_eq!(
            translated.configuration.wakeword.fft_window_type.as_deref(),
            Some("hamming")
        );

        let translated = translate(json!({"wakeword": {"threshold": 0.5}})).unwrap();
        assert_eq!(translated.configuration.wakeword.fft_window_type, None);
    }

    #[test]
    fn null_tuning_values_are_ignored() {
        let translated = translate(json!({"wakeword": {"threshold": null, "customKnob": null}}))
            .unwrap();
        assert_eq!(translated.configuration.wakeword.threshold, None);
        assert!(translated.configuration.extra_properties.is_empty());
    }

    #[test]
    fn wakeword_list_accepts_array() {
        let translated =
            translate(json!({"wakeword": {"wakewords": ["spokestack", "hey there"]}})).unwrap();
        assert_eq!(
            translated.configuration.wakeword.wakewords.as_deref(),
            Some("spokestack,hey there")
        );
    }

    #[test]
    fn wrongly_typed_wakeword_value_is_rejected() {
        let err = translate(json!({"wakeword": {"activeMax": "long"}})).unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::InvalidConfiguration { ref key, .. })
                if key == "wakeword.activeMax"
        ));
    }

    #[test]
    fn network_policy_is_carried() {
        let translated = translate(json!({"allowCellular": true})).unwrap();
        assert!(translated.network_policy.allow_cellular);
        assert!(!translated.network_policy.force_refresh);
    }

    #[test]
    fn wakeword_profile_without_models_still_translates() {
        let translated = translate(json!({"pipeline": {"profile": 0}})).unwrap();
        assert_eq!(
            translated.configuration.profile,
            PipelineProfile::WakewordPlatformAsr
        );
        assert!(!translated.features.wakeword);
    }

    #[test]
    fn kebab_case_splits_on_lower_upper_boundary() {
        assert_eq!(kebab_case("vadFallDelay"), "vad-fall-delay");
        assert_eq!(kebab_case("already-kebab"), "already-kebab");
        assert_eq!(kebab_case("ASRMode"), "ASRMode");
        assert_eq!(kebab_case("agcTargetDB"), "agc-target-dB");
    }

    #[test]
    fn translation_is_deterministic() {
        let config = json!({
            "traceLevel": 30,
            "pipeline": {"profile": 1, "someKey": true},
            "wakeword": full_wakeword(),
        });
        assert_eq!(translate(config.clone()).unwrap(), translate(config).unwrap());
    }

    fn url() -> impl Strategy<Value = Option<String>> {
        proptest::option::of("https://models/[a-z]{1,8}")
    }

    proptest! {
        #[test]
        fn translating_twice_gives_identical_output(
            profile in 0i64..6,
            sample_rate in proptest::option::of(8000u32..48000),
            filter in url(),
            detect in url(),
            encode in url(),
            threshold in proptest::option::of(0.0f64..1.0),
            extra_key in "[a-z]{1,6}[A-Z][a-z]{1,6}",
        ) {
            let config = json!({
                "pipeline": {"profile": profile, "sampleRate": sample_rate, extra_key: 1},
                "wakeword": {
                    "filter": filter,
                    "detect": detect,
                    "encode": encode,
                    "threshold": threshold,
                },
            });
            let first = translate(config.clone());
            let second = translate(config);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn wakeword_enabled_iff_all_three_urls(
            filter in url(),
            detect in url(),
            encode in url(),
        ) {
            let supplied = [&filter, &detect, &encode]
                .iter()
                .filter(|url| url.is_some())
                .count();
            let translated = translate(json!({
                "wakeword": {"filter": filter, "detect": detect, "encode": encode}
            }))
            .unwrap();

            prop_assert_eq!(translated.features.wakeword, supplied == 3);
            let expected_requests = if supplied == 3 { 3 } else { 0 };
            prop_assert_eq!(translated.asset_requests.len(), expected_requests);
        }
    }
}
