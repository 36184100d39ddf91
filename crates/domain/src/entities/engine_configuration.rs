//! Structured engine configuration produced by the configuration translator

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::value_objects::{
    AssetSlot, Credentials, Feature, PipelineProfile, TraceLevel, VadMode,
};

/// Wake-word tuning parameters
///
/// `None` leaves the engine default in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WakewordParameters {
    pub active_min: Option<u32>,
    pub active_max: Option<u32>,
    pub encode_length: Option<u32>,
    pub encode_width: Option<u32>,
    pub state_width: Option<u32>,
    pub threshold: Option<f32>,
    /// Comma-separated keyword list
    pub wakewords: Option<String>,
    pub request_timeout: Option<u32>,
    pub rms_target: Option<f32>,
    pub rms_alpha: Option<f32>,
    pub fft_window_size: Option<u32>,
    pub fft_window_type: Option<String>,
    pub fft_hop_length: Option<u32>,
    pub pre_emphasis: Option<f32>,
    pub mel_frame_length: Option<u32>,
    pub mel_frame_width: Option<u32>,
}

impl WakewordParameters {
    fn write_properties(&self, properties: &mut BTreeMap<String, Value>) {
        let mut put = |name: &str, value: Option<Value>| {
            if let Some(value) = value {
                properties.insert(name.to_string(), value);
            }
        };
        put("wake-active-min", self.active_min.map(Value::from));
        put("wake-active-max", self.active_max.map(Value::from));
        put("wake-encode-length", self.encode_length.map(Value::from));
        put("wake-encode-width", self.encode_width.map(Value::from));
        put("wake-state-width", self.state_width.map(Value::from));
        put("wake-threshold", self.threshold.map(Value::from));
        put("wakewords", self.wakewords.clone().map(Value::from));
        put("wake-request-timeout", self.request_timeout.map(Value::from));
        put("rms-target", self.rms_target.map(Value::from));
        put("rms-alpha", self.rms_alpha.map(Value::from));
        put("fft-window-size", self.fft_window_size.map(Value::from));
        put("fft-window-type", self.fft_window_type.clone().map(Value::from));
        put("fft-hop-length", self.fft_hop_length.map(Value::from));
        put("pre-emphasis", self.pre_emphasis.map(Value::from));
        put("mel-frame-length", self.mel_frame_length.map(Value::from));
        put("mel-frame-width", self.mel_frame_width.map(Value::from));
    }
}

/// Which optional subsystems the engine is built with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureSet {
    pub wakeword: bool,
    pub nlu: bool,
}

impl FeatureSet {
    #[must_use]
    pub const fn is_enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::Wakeword => self.wakeword,
            Feature::Nlu => self.nlu,
        }
    }
}

/// Everything the engine needs to be constructed
///
/// Built incrementally by the translator and the asset provisioner, then handed
/// by value to the engine factory.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfiguration {
    pub credentials: Credentials,
    pub trace_level: TraceLevel,
    pub profile: PipelineProfile,
    pub sample_rate: Option<u32>,
    pub frame_width: Option<u32>,
    pub vad_mode: Option<VadMode>,
    pub vad_fall_delay: Option<u32>,
    pub wakeword: WakewordParameters,
    pub nlu_input_length: Option<u32>,
    /// Keys without a dedicated field, already in kebab-case
    pub extra_properties: BTreeMap<String, Value>,
    model_paths: BTreeMap<AssetSlot, PathBuf>,
}

impl EngineConfiguration {
    /// Configuration with engine defaults and the given credentials
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            trace_level: TraceLevel::default(),
            profile: PipelineProfile::default(),
            sample_rate: None,
            frame_width: None,
            vad_mode: None,
            vad_fall_delay: None,
            wakeword: WakewordParameters::default(),
            nlu_input_length: None,
            extra_properties: BTreeMap::new(),
            model_paths: BTreeMap::new(),
        }
    }

    /// Record the local path a model was provisioned to
    pub fn set_model_path(&mut self, slot: AssetSlot, path: impl Into<PathBuf>) {
        self.model_paths.insert(slot, path.into());
    }

    #[must_use]
    pub fn model_path(&self, slot: AssetSlot) -> Option<&Path> {
        self.model_paths.get(&slot).map(PathBuf::as_path)
    }

    #[must_use]
    pub const fn model_paths(&self) -> &BTreeMap<AssetSlot, PathBuf> {
        &self.model_paths
    }

    /// Whether every model slot of a feature has a resolved path
    #[must_use]
    pub fn has_models_for(&self, feature: Feature) -> bool {
        feature
            .slots()
            .iter()
            .all(|slot| self.model_paths.contains_key(slot))
    }

    /// Flat engine property map
    ///
    /// The client secret is deliberately absent; engines read it from
    /// [`EngineConfiguration::credentials`].
    #[must_use]
    pub fn properties(&self) -> BTreeMap<String, Value> {
        let mut properties = self.extra_properties.clone();

        properties.insert("client-id".to_string(), json!(self.credentials.client_id()));
        properties.insert("trace-level".to_string(), json!(self.trace_level.value()));
        properties.insert("profile".to_string(), json!(self.profile.as_str()));
        if let Some(rate) = self.sample_rate {
            properties.insert("sample-rate".to_string(), json!(rate));
        }
        if let Some(width) = self.frame_width {
            properties.insert("frame-width".to_string(), json!(width));
        }
        if let Some(mode) = self.vad_mode {
            properties.insert("vad-mode".to_string(), json!(mode.value()));
        }
        if let Some(delay) = self.vad_fall_delay {
            properties.insert("vad-fall-delay".to_string(), json!(delay));
        }
        self.wakeword.write_properties(&mut properties);
        if let Some(length) = self.nlu_input_length {
            properties.insert("nlu-input-length".to_string(), json!(length));
        }
        for (slot, path) in &self.model_paths {
            properties.insert(
                slot.property_name().to_string(),
                json!(path.to_string_lossy()),
            );
        }

        properties
    }
}
