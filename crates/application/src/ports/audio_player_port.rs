//! Audio player port - Playback of synthesized speech

#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;
use crate::ports::EngineEventSink;

/// Plays audio from a URL produced by the synthesizer
///
/// Playback progress is reported as `PlaybackStarted` and `PlaybackFinished`
/// on the given sink.
#[cfg_attr(test, automock)]
pub trait AudioPlayerPort: Send + Sync {
    fn play(&self, url: &str, events: EngineEventSink) -> Result<(), ApplicationError>;
}
