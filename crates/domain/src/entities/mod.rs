//! Domain entities

mod asset_request;
mod classification;
mod engine_configuration;
mod engine_event;
mod host_notification;
mod session_config;
mod synthesis_request;

pub use asset_request::{AssetRequest, NetworkPolicy};
pub use classification::{ClassificationResult, SlotValue};
pub use engine_configuration::{EngineConfiguration, FeatureSet, WakewordParameters};
pub use engine_event::EngineEvent;
pub use host_notification::HostNotification;
pub use session_config::{NluSection, PipelineSection, SessionConfig, WakewordSection};
pub use synthesis_request::SynthesisRequest;
