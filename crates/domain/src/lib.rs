//! Domain layer for speechbridge
//!
//! Contains the vocabulary shared by every other crate: operation kinds, pipeline
//! profiles, the typed session configuration, the engine configuration it is
//! translated into, engine events and host notifications.
//! This layer performs no I/O.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
