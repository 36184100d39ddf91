//! Value objects - small immutable types identified by their value

mod asset_slot;
mod connectivity;
mod credentials;
mod operation_kind;
mod pipeline_profile;
mod session_id;
mod trace_level;
mod tts_format;
mod vad_mode;

pub use asset_slot::{AssetSlot, Feature};
pub use connectivity::Connectivity;
pub use credentials::Credentials;
pub use operation_kind::OperationKind;
pub use pipeline_profile::{ActivationTrigger, PipelineProfile, Recognizer};
pub use session_id::SessionId;
pub use trace_level::TraceLevel;
pub use tts_format::TtsFormat;
pub use vad_mode::VadMode;
