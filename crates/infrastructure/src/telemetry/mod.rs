//! Structured logging setup
//!
//! Installs the global `tracing` subscriber used by the CLI and by hosts
//! embedding a speech session.

mod subscriber;

pub use subscriber::{TelemetryConfig, TelemetryError, init_telemetry};
