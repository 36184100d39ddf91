//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer: the on-disk model
//! cache, the HTTP model downloader, connectivity reporting and the host
//! notification bridge. Also owns process configuration and log setup.

pub mod adapters;
pub mod config;
pub mod telemetry;

pub use adapters::*;
pub use config::{AppConfig, AssetsConfig, CredentialsConfig, SessionAppConfig};
pub use telemetry::{TelemetryConfig, TelemetryError, init_telemetry};
