//! Named notifications mirrored to the host

use serde_json::{Value, json};

use crate::entities::{ClassificationResult, EngineEvent};

/// Fire-and-forget notification for passive host observers
#[derive(Debug, Clone, PartialEq)]
pub enum HostNotification {
    Init,
    Start,
    Stop,
    Activate,
    Deactivate,
    Timeout,
    Recognize { transcript: String },
    PartialRecognize { transcript: String },
    Play { playing: bool },
    Synthesize { url: String },
    Classify { result: ClassificationResult },
    Trace { message: String },
    Error { message: String },
}

impl HostNotification {
    /// Event name the host subscribes to
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Activate => "activate",
            Self::Deactivate => "deactivate",
            Self::Timeout => "timeout",
            Self::Recognize { .. } => "recognize",
            Self::PartialRecognize { .. } => "partial_recognize",
            Self::Play { .. } => "play",
            Self::Synthesize { .. } => "synthesize",
            Self::Classify { .. } => "classify",
            Self::Trace { .. } => "trace",
            Self::Error { .. } => "error",
        }
    }

    /// JSON payload delivered with the event
    #[must_use]
    pub fn payload(&self) -> Value {
        match self {
            Self::Init | Self::Start | Self::Stop => json!({}),
            Self::Activate | Self::Deactivate | Self::Timeout => json!({ "transcript": "" }),
            Self::Recognize { transcript } | Self::PartialRecognize { transcript } => {
                json!({ "transcript": transcript })
            },
            Self::Play { playing } => json!({ "playing": playing }),
            Self::Synthesize { url } => json!({ "url": url }),
            Self::Classify { result } => json!({ "result": result }),
            Self::Trace { message } => json!({ "message": message }),
            Self::Error { message } => json!({ "error": message }),
        }
    }
}

impl From<&EngineEvent> for HostNotification {
    fn from(event: &EngineEvent) -> Self {
        match event {
            EngineEvent::Initialized => Self::Init,
            EngineEvent::Started => Self::Start,
            EngineEvent::Stopped => Self::Stop,
            EngineEvent::Activated => Self::Activate,
            EngineEvent::Deactivated => Self::Deactivate,
            EngineEvent::Timeout => Self::Timeout,
            EngineEvent::Recognized { transcript } => Self::Recognize {
                transcript: transcript.clone(),
            },
            EngineEvent::PartialRecognized { transcript } => Self::PartialRecognize {
                transcript: transcript.clone(),
            },
            EngineEvent::Synthesized { url } => Self::Synthesize { url: url.clone() },
            EngineEvent::Classified(result) => Self::Classify {
                result: result.clone(),
            },
            EngineEvent::PlaybackStarted => Self::Play { playing: true },
            EngineEvent::PlaybackFinished => Self::Play { playing: false },
            EngineEvent::Trace { message } => Self::Trace {
                message: message.clone(),
            },
            EngineEvent::Error { cause } => Self::Error {
                message: cause.clone(),
            },
        }
    }
}
