//! Application layer - Speech session orchestration
//!
//! Contains the services that translate the host configuration, provision model
//! assets, drive the engine lifecycle and route engine events to pending caller
//! requests. The ports define what the infrastructure layer has to provide.

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
