//! Engine ports - Interface to the underlying speech pipeline engine
//!
//! The engine is a black box. Calls are non-blocking handoffs; their outcomes
//! arrive later as [`EngineEvent`]s on the [`EngineEventSink`] the engine was
//! built with, from whatever thread the engine happens to run on.

use std::fmt;
use std::sync::Arc;

use domain::entities::{EngineConfiguration, EngineEvent, FeatureSet, SynthesisRequest};
use domain::value_objects::OperationKind;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::error::ApplicationError;

/// Synchronous refusal of an engine call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EngineError {
    pub message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Attribute the failure to the operation that triggered it
    pub fn into_fault(self, operation: OperationKind) -> ApplicationError {
        ApplicationError::EngineFault {
            operation,
            cause: self.message,
        }
    }
}

/// Handle through which the engine and the audio player report events
///
/// Cheap to clone and safe to use from any thread.
#[derive(Clone)]
pub struct EngineEventSink {
    sender: mpsc::UnboundedSender<EngineEvent>,
}

impl fmt::Debug for EngineEventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineEventSink")
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}

impl EngineEventSink {
    /// Create a sink and the receiving end of its queue
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<EngineEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Queue an event; returns `false` once the session is gone
    pub fn dispatch(&self, event: EngineEvent) -> bool {
        self.sender.send(event).is_ok()
    }
}

/// A constructed speech pipeline
#[cfg_attr(test, automock)]
pub trait SpeechEnginePort: Send + Sync {
    /// Begin capturing audio; completion is reported as `Started`
    fn start(&self) -> Result<(), EngineError>;

    /// Stop capturing audio; completion is reported as `Stopped`
    fn stop(&self) -> Result<(), EngineError>;

    /// Open the microphone for an utterance; reported as `Activated`
    fn activate(&self) -> Result<(), EngineError>;

    fn deactivate(&self) -> Result<(), EngineError>;

    /// Request synthesis; the result is reported as `Synthesized`
    fn synthesize(&self, request: &SynthesisRequest) -> Result<(), EngineError>;

    /// Classify an utterance; the result is reported as `Classified`
    fn classify(&self, utterance: &str) -> Result<(), EngineError>;
}

/// Builds engine instances from a finished configuration
#[cfg_attr(test, automock)]
pub trait EngineFactoryPort: Send + Sync {
    /// Construct the engine
    ///
    /// Features whose models were not provisioned are disabled in `features`.
    fn build(
        &self,
        configuration: &EngineConfiguration,
        features: FeatureSet,
        events: EngineEventSink,
    ) -> Result<Arc<dyn SpeechEnginePort>, EngineError>;
}
