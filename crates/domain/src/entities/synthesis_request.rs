//! Text-to-speech request handed to the engine

use serde::{Deserialize, Serialize};

use crate::value_objects::TtsFormat;

/// Text to synthesize, its markup format and the voice to use
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    pub text: String,
    pub format: TtsFormat,
    pub voice: String,
}

impl SynthesisRequest {
    pub fn new(text: impl Into<String>, format: TtsFormat, voice: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format,
            voice: voice.into(),
        }
    }
}
