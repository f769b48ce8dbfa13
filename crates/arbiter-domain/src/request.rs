//! Arbitration request lifecycle

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an arbitration request, based on UUIDv7.
///
/// UUIDv7 gives chronological sortability for request listings and needs no
/// coordination between writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u128);

impl RequestId {
    /// Generate a new UUIDv7-based RequestId
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a RequestId from a raw u128 value (storage deserialization)
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a RequestId from its UUID string form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid request id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// Lifecycle state of an arbitration request.
///
/// `Completed` and `Failed` are terminal and immutable; claims or partial
/// rows written before a failure are kept (no cross-stage rollback).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Accepted, not yet started
    Pending,

    /// Pipeline running
    Processing,

    /// Result persisted
    Completed,

    /// Unrecoverable persistence error; `error_message` is set
    Failed,
}

impl RequestStatus {
    /// Get the status as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Processing => "processing",
            RequestStatus::Completed => "completed",
            RequestStatus::Failed => "failed",
        }
    }

    /// Parse a status from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(RequestStatus::Pending),
            "processing" => Some(RequestStatus::Processing),
            "completed" => Some(RequestStatus::Completed),
            "failed" => Some(RequestStatus::Failed),
            _ => None,
        }
    }

    /// Whether the status is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Completed | RequestStatus::Failed)
    }

    /// Whether transitioning to `next` is legal
    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        match self {
            RequestStatus::Pending => matches!(
                next,
                RequestStatus::Processing | RequestStatus::Completed | RequestStatus::Failed
            ),
            RequestStatus::Processing => {
                matches!(next, RequestStatus::Completed | RequestStatus::Failed)
            }
            RequestStatus::Completed | RequestStatus::Failed => false,
        }
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid request status: {}", s))
    }
}

/// A persisted arbitration request row
#[derive(Debug, Clone, PartialEq)]
pub struct ArbitrationRequest {
    /// Request identifier
    pub id: RequestId,

    /// Domain under arbitration
    pub domain: String,

    /// Current lifecycle state
    pub status: RequestStatus,

    /// Failure description, set only in `Failed`
    pub error_message: Option<String>,

    /// Unix seconds at creation
    pub created_at: u64,

    /// Unix seconds at last status change
    pub updated_at: u64,
}
