//! Pending request table
//!
//! At most one outstanding request per [`OperationKind`]. Each entry is
//! completed exactly once, either with an outcome or with an error, and is
//! removed in the same step.

use std::collections::HashMap;

use domain::entities::ClassificationResult;
use domain::value_objects::OperationKind;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::error::ApplicationError;

/// Successful outcome of a caller request
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    /// Lifecycle and playback requests carry no payload
    Completed,
    Synthesized { url: String },
    Classified(ClassificationResult),
}

/// What to do when a request arrives while one of the same kind is pending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateRequestPolicy {
    /// Fail the new request with `AlreadyPending`
    #[default]
    Reject,
    /// Fail the earlier request with `Superseded` and track the new one
    Overwrite,
}

type Completion = oneshot::Sender<Result<RequestOutcome, ApplicationError>>;

/// Table of outstanding caller requests keyed by operation kind
#[derive(Debug, Default)]
pub struct PendingRequests {
    policy: DuplicateRequestPolicy,
    entries: Mutex<HashMap<OperationKind, Completion>>,
}

/// Handle a caller awaits for the outcome of its request
#[derive(Debug)]
pub struct PendingRequest {
    kind: OperationKind,
    receiver: oneshot::Receiver<Result<RequestOutcome, ApplicationError>>,
}

impl PendingRequest {
    pub const fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Wait for the request to be resolved or rejected
    pub async fn wait(self) -> Result<RequestOutcome, ApplicationError> {
        self.receiver
            .await
            .unwrap_or(Err(ApplicationError::SessionClosed))
    }
}

impl PendingRequests {
    pub fn new(policy: DuplicateRequestPolicy) -> Self {
        Self {
            policy,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub const fn policy(&self) -> DuplicateRequestPolicy {
        self.policy
    }

    /// Insert a request of `kind`
    ///
    /// An entry whose caller has stopped waiting does not count as pending.
    pub fn register(&self, kind: OperationKind) -> Result<PendingRequest, ApplicationError> {
        let mut entries = self.entries.lock();

        if entries.get(&kind).is_some_and(|sender| !sender.is_closed()) {
            match self.policy {
                DuplicateRequestPolicy::Reject => {
                    debug!(%kind, "Rejecting duplicate request");
                    return Err(ApplicationError::AlreadyPending(kind));
                },
                DuplicateRequestPolicy::Overwrite => {
                    debug!(%kind, "Superseding pending request");
                    if let Some(previous) = entries.remove(&kind) {
                        let _ = previous.send(Err(ApplicationError::Superseded(kind)));
                    }
                },
            }
        }

        let (sender, receiver) = oneshot::channel();
        entries.insert(kind, sender);
        Ok(PendingRequest { kind, receiver })
    }

    /// Complete the pending request of `kind` successfully
    ///
    /// Returns `false` if no request of that kind was pending.
    pub fn resolve(&self, kind: OperationKind, outcome: RequestOutcome) -> bool {
        self.complete(kind, Ok(outcome))
    }

    /// Complete the pending request of `kind` with an error
    pub fn reject(&self, kind: OperationKind, error: ApplicationError) -> bool {
        self.complete(kind, Err(error))
    }

    /// Reject every pending request and clear the table
    ///
    /// `error_for` builds the error delivered to each kind.
    pub fn reject_all(&self, error_for: impl Fn(OperationKind) -> ApplicationError) -> usize {
        let drained: Vec<_> = self.entries.lock().drain().collect();
        let count = drained.len();
        for (kind, sender) in drained {
            let _ = sender.send(Err(error_for(kind)));
        }
        if count > 0 {
            warn!(count, "Rejected all pending requests");
        }
        count
    }

    pub fn is_pending(&self, kind: OperationKind) -> bool {
        self.entries
            .lock()
            .get(&kind)
            .is_some_and(|sender| !sender.is_closed())
    }

    /// Kinds currently pending, in declaration order
    pub fn pending_kinds(&self) -> Vec<OperationKind> {
        let entries = self.entries.lock();
        let mut kinds: Vec<_> = entries.keys().copied().collect();
        kinds.sort_unstable();
        kinds
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn complete(
        &self,
        kind: OperationKind,
        result: Result<RequestOutcome, ApplicationError>,
    ) -> bool {
        let Some(sender) = self.entries.lock().remove(&kind) else {
            return false;
        };
        // The caller may have given up waiting; the entry is gone either way
        if sender.send(result).is_err() {
            debug!(%kind, "Caller stopped waiting before completion");
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn table() -> PendingRequests {
        PendingRequests::new(DuplicateRequestPolicy::Reject)
    }

    #[tokio::test]
    async fn resolve_completes_and_removes() {
        let table = table();
        let request = table.register(OperationKind::Start).unwrap();
        assert!(table.is_pending(OperationKind::Start));

        assert!(table.resolve(OperationKind::Start, RequestOutcome::Completed));
        assert!(!table.resolve(OperationKind::Start, RequestOutcome::Completed));
        assert!(table.is_empty());
        assert_eq!(request.wait().await, Ok(RequestOutcome::Completed));
    }

    #[test]
    fn wait_stays_pending_until_resolved() {
        let table = table();
        let request = table.register(OperationKind::Start).unwrap();
        let mut waiting = tokio_test::task::spawn(request.wait());
        tokio_test::assert_pending!(waiting.poll());

        table.resolve(OperationKind::Start, RequestOutcome::Completed);
        assert!(waiting.is_woken());
        let outcome = tokio_test::assert_ready!(waiting.poll());
        assert_eq!(outcome, Ok(RequestOutcome::Completed));
    }

    #[tokio::test]
    async fn reject_delivers_error_once() {
        let table = table();
        let request = table.register(OperationKind::Activate).unwrap();
        assert!(table.reject(OperationKind::Activate, ApplicationError::NotStarted));
        assert!(!table.reject(OperationKind::Activate, ApplicationError::NotStarted));
        assert_eq!(request.wait().await, Err(ApplicationError::NotStarted));
    }

    #[test]
    fn duplicate_is_rejected_by_default() {
        let table = table();
        let _first = table.register(OperationKind::Speak).unwrap();
        let err = table.register(OperationKind::Speak).unwrap_err();
        assert_eq!(err, ApplicationError::AlreadyPending(OperationKind::Speak));
        assert_eq!(table.len(), 1);
    }

    #[tokio::test]
    async fn overwrite_supersedes_earlier_request() {
        let table = PendingRequests::new(DuplicateRequestPolicy::Overwrite);
        let first = table.register(OperationKind::Speak).unwrap();
        let second = table.register(OperationKind::Speak).unwrap();

        assert!(table.resolve(OperationKind::Speak, RequestOutcome::Completed));
        assert_eq!(
            first.wait().await,
            Err(ApplicationError::Superseded(OperationKind::Speak))
        );
        assert_eq!(second.wait().await, Ok(RequestOutcome::Completed));
    }

    #[test]
    fn abandoned_entry_does_not_block_new_request() {
        let table = table();
        drop(table.register(OperationKind::Classify).unwrap());
        assert!(!table.is_pending(OperationKind::Classify));
        assert!(table.register(OperationKind::Classify).is_ok());
    }

    #[tokio::test]
    async fn dropped_table_closes_requests() {
        let table = table();
        let request = table.register(OperationKind::Stop).unwrap();
        drop(table);
        assert_eq!(request.wait().await, Err(ApplicationError::SessionClosed));
    }

    #[tokio::test]
    async fn reject_all_clears_table() {
        let table = table();
        let start = table.register(OperationKind::Start).unwrap();
        let synth = table.register(OperationKind::Synthesize).unwrap();

        let count = table.reject_all(|kind| ApplicationError::EngineFault {
            operation: kind,
            cause: "boom".to_string(),
        });
        assert_eq!(count, 2);
        assert!(table.is_empty());
        assert_eq!(start.wait().await.unwrap_err().code(), "start_error");
        assert_eq!(synth.wait().await.unwrap_err().code(), "synthesize_error");
    }

    #[test]
    fn policy_deserializes_lowercase() {
        let policy: DuplicateRequestPolicy = serde_json::from_str("\"overwrite\"").unwrap();
        assert_eq!(policy, DuplicateRequestPolicy::Overwrite);
    }

    proptest! {
        #[test]
        fn engine_fault_rejects_every_distinct_pending_kind(mask in 0u8..=255) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let table = table();
            let kinds: Vec<_> = OperationKind::ALL
                .into_iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, kind)| kind)
                .collect();
            let requests: Vec<_> = kinds.iter().map(|kind| table.register(*kind).unwrap()).collect();

            let rejected = table.reject_all(|kind| ApplicationError::EngineFault {
                operation: kind,
                cause: "engine crashed".to_string(),
            });

            prop_assert_eq!(rejected, kinds.len());
            prop_assert!(table.is_empty());
            for request in requests {
                let kind = request.kind();
                let outcome = runtime.block_on(request.wait());
                prop_assert_eq!(
                    outcome,
                    Err(ApplicationError::EngineFault {
                        operation: kind,
                        cause: "engine crashed".to_string(),
                    })
                );
            }
        }

        #[test]
        fn each_kind_resolves_exactly_once(index in 0usize..8) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let kind = OperationKind::ALL[index];
            let table = table();
            let request = table.register(kind).unwrap();

            prop_assert!(table.resolve(kind, RequestOutcome::Completed));
            prop_assert!(!table.resolve(kind, RequestOutcome::Completed));
            prop_assert!(!table.is_pending(kind));
            prop_assert_eq!(runtime.block_on(request.wait()), Ok(RequestOutcome::Completed));
        }
    }
}
