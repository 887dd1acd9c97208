//! Call completion status.
//!
//! A [`Status`] is what a call is closed with: one of the canonical RPC status
//! codes plus an optional human-readable description.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical RPC status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[allow(missing_docs)]
pub enum StatusCode {
    Ok,
    Cancelled,
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    OutOfRange,
    Unimplemented,
    Internal,
    Unavailable,
    DataLoss,
    Unauthenticated,
}

impl StatusCode {
    /// Numeric value of this code as carried on the wire.
    pub fn value(self) -> i32 {
        match self {
            StatusCode::Ok => 0,
            StatusCode::Cancelled => 1,
            StatusCode::Unknown => 2,
            StatusCode::InvalidArgument => 3,
            StatusCode::DeadlineExceeded => 4,
            StatusCode::NotFound => 5,
            StatusCode::AlreadyExists => 6,
            StatusCode::PermissionDenied => 7,
            StatusCode::ResourceExhausted => 8,
            StatusCode::FailedPrecondition => 9,
            StatusCode::Aborted => 10,
            StatusCode::OutOfRange => 11,
            StatusCode::Unimplemented => 12,
            StatusCode::Internal => 13,
            StatusCode::Unavailable => 14,
            StatusCode::DataLoss => 15,
            StatusCode::Unauthenticated => 16,
        }
    }

    /// Look up a code by its numeric value; unknown values map to `Unknown`.
    pub fn from_value(value: i32) -> Self {
        match value {
            0 => StatusCode::Ok,
            1 => StatusCode::Cancelled,
            3 => StatusCode::InvalidArgument,
            4 => StatusCode::DeadlineExceeded,
            5 => StatusCode::NotFound,
            6 => StatusCode::AlreadyExists,
            7 => StatusCode::PermissionDenied,
            8 => StatusCode::ResourceExhausted,
            9 => StatusCode::FailedPrecondition,
            10 => StatusCode::Aborted,
            11 => StatusCode::OutOfRange,
            12 => StatusCode::Unimplemented,
            13 => StatusCode::Internal,
            14 => StatusCode::Unavailable,
            15 => StatusCode::DataLoss,
            16 => StatusCode::Unauthenticated,
            _ => StatusCode::Unknown,
        }
    }

    /// Upper-case name of the code, e.g. `RESOURCE_EXHAUSTED`.
    pub fn as_str(self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Cancelled => "CANCELLED",
            StatusCode::Unknown => "UNKNOWN",
            StatusCode::InvalidArgument => "INVALID_ARGUMENT",
            StatusCode::DeadlineExceeded => "DEADLINE_EXCEEDED",
            StatusCode::NotFound => "NOT_FOUND",
            StatusCode::AlreadyExists => "ALREADY_EXISTS",
            StatusCode::PermissionDenied => "PERMISSION_DENIED",
            StatusCode::ResourceExhausted => "RESOURCE_EXHAUSTED",
            StatusCode::FailedPrecondition => "FAILED_PRECONDITION",
            StatusCode::Aborted => "ABORTED",
            StatusCode::OutOfRange => "OUT_OF_RANGE",
            StatusCode::Unimplemented => "UNIMPLEMENTED",
            StatusCode::Internal => "INTERNAL",
            StatusCode::Unavailable => "UNAVAILABLE",
            StatusCode::DataLoss => "DATA_LOSS",
            StatusCode::Unauthenticated => "UNAUTHENTICATED",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final status of a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    code: StatusCode,
    description: Option<String>,
}

impl Status {
    /// `OK` status, used to close successful calls.
    pub const OK: Status = Status {
        code: StatusCode::Ok,
        description: None,
    };

    /// Create a status without a description.
    pub fn new(code: StatusCode) -> Self {
        Self {
            code,
            description: None,
        }
    }

    /// Attach or replace the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// `CANCELLED` with a description.
    pub fn cancelled(description: impl Into<String>) -> Self {
        Self::new(StatusCode::Cancelled).with_description(description)
    }

    /// `UNAUTHENTICATED` with a description.
    pub fn unauthenticated(description: impl Into<String>) -> Self {
        Self::new(StatusCode::Unauthenticated).with_description(description)
    }

    /// `PERMISSION_DENIED` with a description.
    pub fn permission_denied(description: impl Into<String>) -> Self {
        Self::new(StatusCode::PermissionDenied).with_description(description)
    }

    /// `RESOURCE_EXHAUSTED` with a description.
    pub fn resource_exhausted(description: impl Into<String>) -> Self {
        Self::new(StatusCode::ResourceExhausted).with_description(description)
    }

    /// `UNIMPLEMENTED` with a description.
    pub fn unimplemented(description: impl Into<String>) -> Self {
        Self::new(StatusCode::Unimplemented).with_description(description)
    }

    /// `INTERNAL` with a description.
    pub fn internal(description: impl Into<String>) -> Self {
        Self::new(StatusCode::Internal).with_description(description)
    }

    /// The status code.
    pub fn code(&self) -> StatusCode {
        self.code
    }

    /// The description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether this status reports success.
    pub fn is_ok(&self) -> bool {
        self.code == StatusCode::Ok
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(description) => write!(f, "{}: {}", self.code, description),
            None => write!(f, "{}", self.code),
        }
    }
}

impl std::error::Error for Status {}
