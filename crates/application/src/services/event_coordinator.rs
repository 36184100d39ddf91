//! Event coordinator - Matches engine events to pending caller requests
//!
//! Routing only; mirroring events to the host is the notification
//! publisher's job.

use std::fmt;
use std::sync::Arc;

use domain::entities::EngineEvent;
use domain::value_objects::OperationKind;
use tracing::{debug, info, warn};

use crate::error::ApplicationError;
use crate::ports::{AudioPlayerPort, EngineEventSink};
use crate::services::{PendingRequests, RequestOutcome};

/// Resolves and rejects pending requests as engine events arrive
pub struct EventCoordinator {
    pending: Arc<PendingRequests>,
    player: Arc<dyn AudioPlayerPort>,
    events: EngineEventSink,
}

impl fmt::Debug for EventCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventCoordinator")
            .field("pending", &self.pending.pending_kinds())
            .finish_non_exhaustive()
    }
}

impl EventCoordinator {
    /// `events` is handed to the audio player so playback reports come back
    /// through the same queue as engine events
    pub fn new(
        pending: Arc<PendingRequests>,
        player: Arc<dyn AudioPlayerPort>,
        events: EngineEventSink,
    ) -> Self {
        Self {
            pending,
            player,
            events,
        }
    }

    /// Route one event to the request it completes, if any
    pub fn route(&self, event: &EngineEvent) {
        if let Some(kind) = event.lifecycle_kind() {
            self.pending.resolve(kind, RequestOutcome::Completed);
            return;
        }

        match event {
            EngineEvent::Synthesized { url } => self.on_synthesized(url),
            EngineEvent::PlaybackStarted => {
                self.pending
                    .resolve(OperationKind::Speak, RequestOutcome::Completed);
            },
            EngineEvent::Classified(result) => {
                self.pending.resolve(
                    OperationKind::Classify,
                    RequestOutcome::Classified(result.clone()),
                );
            },
            EngineEvent::Error { cause } => {
                let rejected = self.pending.reject_all(|operation| ApplicationError::EngineFault {
                    operation,
                    cause: cause.clone(),
                });
                warn!(%cause, rejected, "Engine reported an error");
            },
            _ => {},
        }
    }

    fn on_synthesized(&self, url: &str) {
        if self.pending.resolve(
            OperationKind::Synthesize,
            RequestOutcome::Synthesized {
                url: url.to_string(),
            },
        ) {
            return;
        }

        if !self.pending.is_pending(OperationKind::Speak) {
            debug!(url, "Synthesis result with no pending request");
            return;
        }

        info!(url, "Playing synthesized speech");
        if let Err(e) = self.player.play(url, self.events.clone()) {
            warn!(error = %e, "Playback failed");
            self.pending.reject(OperationKind::Speak, e);
        }
    }
}
