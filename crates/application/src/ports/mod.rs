//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod asset_ports;
mod audio_player_port;
mod engine_port;
mod host_bridge_port;

#[cfg(test)]
pub use asset_ports::{MockModelCachePort, MockModelDownloaderPort, MockNetworkMonitorPort};
pub use asset_ports::{ModelCachePort, ModelDownloaderPort, NetworkMonitorPort};
#[cfg(test)]
pub use audio_player_port::MockAudioPlayerPort;
pub use audio_player_port::AudioPlayerPort;
#[cfg(test)]
pub use engine_port::{MockEngineFactoryPort, MockSpeechEnginePort};
pub use engine_port::{EngineError, EngineEventSink, EngineFactoryPort, SpeechEnginePort};
#[cfg(test)]
pub use host_bridge_port::MockHostBridgePort;
pub use host_bridge_port::HostBridgePort;
