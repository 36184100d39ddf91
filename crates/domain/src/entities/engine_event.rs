//! Events emitted by the speech engine and the audio player

use crate::entities::ClassificationResult;
use crate::value_objects::OperationKind;

/// Asynchronous event from the engine's own execution context
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The pipeline was constructed
    Initialized,
    Started,
    Stopped,
    /// The pipeline began listening for an utterance
    Activated,
    Deactivated,
    Recognized { transcript: String },
    PartialRecognized { transcript: String },
    /// Activation ended without a recognized utterance
    Timeout,
    /// Speech was synthesized and is available at `url`
    Synthesized { url: String },
    Classified(ClassificationResult),
    PlaybackStarted,
    PlaybackFinished,
    Trace { message: String },
    /// Unrecoverable engine fault
    Error { cause: String },
}

impl EngineEvent {
    /// Short name for logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Initialized => "initialized",
            Self::Started => "started",
            Self::Stopped => "stopped",
            Self::Activated => "activated",
            Self::Deactivated => "deactivated",
            Self::Recognized { .. } => "recognized",
            Self::PartialRecognized { .. } => "partial_recognized",
            Self::Timeout => "timeout",
            Self::Synthesized { .. } => "synthesized",
            Self::Classified(_) => "classified",
            Self::PlaybackStarted => "playback_started",
            Self::PlaybackFinished => "playback_finished",
            Self::Trace { .. } => "trace",
            Self::Error { .. } => "error",
        }
    }

    /// Operation kind a lifecycle event completes
    #[must_use]
    pub const fn lifecycle_kind(&self) -> Option<OperationKind> {
        match self {
            Self::Initialized => Some(OperationKind::Initialize),
            Self::Started => Some(OperationKind::Start),
            Self::Stopped => Some(OperationKind::Stop),
            Self::Activated => Some(OperationKind::Activate),
            Self::Deactivated => Some(OperationKind::Deactivate),
            _ => None,
        }
    }
}
