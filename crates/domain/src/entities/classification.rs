//! Natural-language understanding results

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One slot extracted from an utterance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotValue {
    /// Slot type as declared in the NLU model metadata
    #[serde(rename = "type")]
    pub slot_type: String,
    /// Normalized value; absent when the slot was not filled
    pub value: Option<Value>,
    /// Text the value was parsed from
    pub raw_value: Option<String>,
}

/// Intent classification of an utterance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub intent: String,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,
    pub slots: BTreeMap<String, SlotValue>,
}

impl ClassificationResult {
    pub fn new(intent: impl Into<String>, confidence: f32) -> Self {
        Self {
            intent: intent.into(),
            confidence,
            slots: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_slot(mut self, name: impl Into<String>, slot: SlotValue) -> Self {
        self.slots.insert(name.into(), slot);
        self
    }
}
