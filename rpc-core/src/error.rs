//! Error types for RPC call setup and service definition handling.
//!
//! Errors raised while rewriting a service definition or while an interceptor
//! chain sets up a call are carried by [`RpcError`]. The chain never catches or
//! translates them: whatever an interceptor or terminal handler returns reaches
//! the transport unchanged, and the transport decides how to surface it. The
//! [`RpcError::to_status`] helper gives transports a canonical mapping.

use crate::status::{Status, StatusCode};
use thiserror::Error;

/// The main error type for all RPC core operations.
///
/// # Examples
///
/// ```rust
/// use rpc_core::error::RpcError;
/// use rpc_core::status::Status;
///
/// let error = RpcError::from(Status::unauthenticated("missing token"));
/// assert_eq!(error.category(), "status");
/// ```
#[derive(Error, Debug)]
pub enum RpcError {
    /// A required argument was absent
    #[error("Required argument '{argument}' was absent")]
    NullArgument {
        /// Name of the missing argument
        argument: &'static str,
    },

    /// A handler or interceptor rejected the call with an explicit status
    #[error("Call rejected: {0}")]
    Status(#[from] Status),

    /// Service or method definition errors
    #[error("Definition error: {0}")]
    Definition(#[from] DefinitionError),

    /// Errors raised by a call object (closed twice, cancelled, etc.)
    #[error("Call error: {0}")]
    Call(#[from] CallError),

    /// Configuration errors (invalid config files, missing parameters, etc.)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        /// The underlying serde_json error
        source: serde_json::Error,
    },

    /// IO errors (config files and the like)
    #[error("IO error: {source}")]
    Io {
        #[from]
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Generic errors for cases not covered by specific variants
    #[error("Internal error: {message}")]
    Internal {
        /// Error message
        message: String,
    },
}

/// Errors raised while assembling a service definition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum DefinitionError {
    /// Service names must not be empty
    #[error("Service name cannot be empty")]
    EmptyServiceName,

    /// Two methods with the same full name were added to one service
    #[error("Method '{method}' is already registered on service '{service}'")]
    DuplicateMethod { service: String, method: String },

    /// A method whose full name belongs to a different service
    #[error("Method '{method}' does not belong to service '{service}'")]
    ServiceNameMismatch { service: String, method: String },
}

/// Errors raised by [`ServerCall`](crate::call::ServerCall) implementations.
///
/// The core never produces these itself; they exist so transports and
/// forwarding calls share one vocabulary for call misuse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum CallError {
    /// The call was already closed
    #[error("Call '{method}' is already closed")]
    AlreadyClosed { method: String },

    /// Headers can only be sent once
    #[error("Headers for call '{method}' were already sent")]
    HeadersAlreadySent { method: String },

    /// The peer cancelled the call
    #[error("Call '{method}' was cancelled")]
    Cancelled { method: String },
}

/// Configuration-related errors.
///
/// These errors occur when configuration files are invalid,
/// missing required parameters, or contain conflicting settings.
#[derive(Error, Debug, Clone)]
#[allow(missing_docs)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// Configuration file has invalid format
    #[error("Invalid configuration format in {path}: {reason}")]
    InvalidFormat { path: String, reason: String },

    /// Required configuration parameter is missing
    #[error("Missing required configuration parameter: {parameter}")]
    MissingParameter { parameter: String },

    /// Configuration parameter has invalid value
    #[error("Invalid value for parameter '{parameter}': {value} - {reason}")]
    InvalidValue {
        parameter: String,
        value: String,
        reason: String,
    },

    /// Conflicting configuration parameters
    #[error("Conflicting configuration: {reason}")]
    Conflict { reason: String },
}

/// Convenience type alias for Results using RpcError.
pub type RpcResult<T> = Result<T, RpcError>;

impl RpcError {
    /// Create a new internal error with a custom message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rpc_core::error::RpcError;
    ///
    /// let error = RpcError::internal("Something went wrong");
    /// assert_eq!(error.category(), "internal");
    /// ```
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the error category for this error.
    ///
    /// This is useful for error reporting and metrics collection.
    pub fn category(&self) -> &'static str {
        match self {
            RpcError::NullArgument { .. } => "null_argument",
            RpcError::Status(_) => "status",
            RpcError::Definition(_) => "definition",
            RpcError::Call(_) => "call",
            RpcError::Config(_) => "config",
            RpcError::Serialization { .. } => "serialization",
            RpcError::Io { .. } => "io",
            RpcError::Internal { .. } => "internal",
        }
    }

    /// Map this error to the status a transport should close the call with.
    ///
    /// Explicit rejections keep their status; everything else becomes
    /// `INTERNAL` except cancellation, which stays `CANCELLED`.
    pub fn to_status(&self) -> Status {
        match self {
            RpcError::Status(status) => status.clone(),
            RpcError::Call(CallError::Cancelled { .. }) => {
                Status::new(StatusCode::Cancelled).with_description(self.to_string())
            }
            RpcError::Serialization { .. } => {
                Status::new(StatusCode::InvalidArgument).with_description(self.to_string())
            }
            _ => Status::internal(self.to_string()),
        }
    }
}
