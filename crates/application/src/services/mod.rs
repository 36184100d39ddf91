//! Application services - The speech session orchestrator

mod asset_provisioner;
mod config_translator;
mod event_coordinator;
mod notification_publisher;
mod pending_requests;
mod pipeline_controller;
mod speech_session;

pub use asset_provisioner::{AssetProvisioner, ProvisionedAsset, ProvisioningProgress};
pub use config_translator::{ConfigTranslator, TranslatedConfig, kebab_case};
pub use event_coordinator::EventCoordinator;
pub use notification_publisher::NotificationPublisher;
pub use pending_requests::{
    DuplicateRequestPolicy, PendingRequest, PendingRequests, RequestOutcome,
};
pub use pipeline_controller::{Dispatch, InitializationGate, PipelineController, PipelinePhase};
pub use speech_session::{SessionDependencies, SessionOptions, SpeechSession};
