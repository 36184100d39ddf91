//! Application-level errors

use domain::DomainError;
use domain::value_objects::OperationKind;
use thiserror::Error;

/// Errors that can occur in the application layer
///
/// `Clone` so that a single engine fault can be delivered to every pending request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplicationError {
    /// Domain-level error (invalid argument or configuration)
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Operation needs a subsystem that has not been built
    #[error("The speech pipeline is not initialized. Call initialize() first.")]
    NotInitialized,

    /// Activation before the pipeline is running
    #[error("The speech pipeline is not yet running. Call start() before activate().")]
    NotStarted,

    /// Download refused by the network policy
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    /// Download needed while connectivity is not yet known
    #[error("Network status is not yet available")]
    NetworkStatusUnavailable,

    /// Failure reported by the speech engine
    #[error("Engine error during {operation}: {cause}")]
    EngineFault {
        operation: OperationKind,
        cause: String,
    },

    /// A model asset could not be fetched or stored
    #[error("Failed to provision '{name}': {reason}")]
    AssetFetch { name: String, reason: String },

    /// A request of the same kind is still outstanding
    #[error("A {0} request is already pending")]
    AlreadyPending(OperationKind),

    /// Replaced by a newer request of the same kind
    #[error("The {0} request was superseded by a newer request")]
    Superseded(OperationKind),

    /// Initialization failed earlier; the session cannot be reused
    #[error("Speech session failed to initialize: {0}")]
    SessionFailed(String),

    /// The session was dropped before the request completed
    #[error("Speech session closed")]
    SessionClosed,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Stable machine-readable code a host bridge forwards as the rejection code
    pub fn code(&self) -> String {
        match self {
            Self::Domain(DomainError::InvalidArgument(_)) => "invalid_argument".to_string(),
            Self::Domain(DomainError::InvalidConfiguration { .. }) | Self::Configuration(_) => {
                "invalid_configuration".to_string()
            },
            Self::NotInitialized => "not_initialized".to_string(),
            Self::NotStarted => "not_started".to_string(),
            Self::NetworkUnavailable(_) => "network_unavailable".to_string(),
            Self::NetworkStatusUnavailable => "network_status_unavailable".to_string(),
            Self::EngineFault { operation, .. } => format!("{operation}_error"),
            Self::AssetFetch { .. } => "asset_fetch_failed".to_string(),
            Self::AlreadyPending(_) => "already_pending".to_string(),
            Self::Superseded(_) => "superseded".to_string(),
            Self::SessionFailed(_) => "session_failed".to_string(),
            Self::SessionClosed => "session_closed".to_string(),
            Self::Internal(_) => "internal".to_string(),
        }
    }

    /// Whether the error came from the engine rather than from the caller
    pub const fn is_engine_fault(&self) -> bool {
        matches!(self, Self::EngineFault { .. })
    }
}
